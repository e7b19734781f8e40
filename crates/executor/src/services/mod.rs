pub mod execution_service;
pub mod message_formatter;
pub mod telegram_service;
