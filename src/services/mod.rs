pub mod payload_services;
