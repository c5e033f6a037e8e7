pub mod http_notification_sender;
