pub mod contact;
pub mod flash;
pub mod trip;
