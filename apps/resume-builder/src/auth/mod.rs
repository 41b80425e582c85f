pub mod form;
pub mod handlers;
pub mod session;
pub mod storage;
