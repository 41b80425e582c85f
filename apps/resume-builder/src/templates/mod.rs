pub mod catalog;
pub mod cover_letter;
pub mod fetcher;
pub mod handlers;
pub mod html;
pub mod populator;
