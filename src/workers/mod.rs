pub mod due_date_monitor;

pub use due_date_monitor::run_due_date_monitor;
