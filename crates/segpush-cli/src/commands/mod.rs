pub mod init;
pub mod push;
