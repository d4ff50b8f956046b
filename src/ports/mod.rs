pub mod cyclist_repository;
pub mod equipment_gateway;
pub mod notification_gateway;
pub mod payment_gateway;
pub mod rental_repository;

pub use cyclist_repository::CyclistRepository;
pub use equipment_gateway::{BicycleSnapshot, DockSnapshot, EquipmentGateway};
pub use notification_gateway::NotificationGateway;
pub use payment_gateway::{ChargeReceipt, PaymentGateway};
pub use rental_repository::{InsertOpenError, RentalRepository};
