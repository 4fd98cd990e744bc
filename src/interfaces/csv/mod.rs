pub mod postage_writer;
pub mod request_reader;
