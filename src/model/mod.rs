// File: ./src/model/mod.rs
pub mod appointment;
pub mod holiday;
pub mod matcher;

pub use appointment::{
    Appointment, AppointmentDraft, AppointmentFields, AppointmentStatus, Category, classify,
};
pub use holiday::{HOLIDAYS, Holiday, HolidayScope, holiday_on};
