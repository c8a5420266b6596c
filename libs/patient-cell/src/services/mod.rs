pub mod index;
pub mod manager;
pub mod schedule;
pub mod store;

pub use index::PatientIndex;
pub use manager::HospitalManager;
pub use schedule::AppointmentQueue;
pub use store::PatientStore;
