pub mod appointment_writer;
pub mod tutor_writer;
