pub mod equipment_client;
pub mod external_client;

pub use equipment_client::EquipmentClient;
pub use external_client::ExternalClient;
