pub mod init;
pub mod run;
pub mod summary;
pub mod train;
pub mod validate;
