//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod booking;
pub mod experience;
pub mod promo_code;
pub mod slot;
pub mod user;

// Re-export specific types to avoid conflicts
pub use booking::{BookingStatus, Column as BookingColumn, Entity as Booking, Model as BookingModel};
pub use experience::{
    Column as ExperienceColumn, Entity as Experience, Model as ExperienceModel,
};
pub use promo_code::{
    Column as PromoCodeColumn, DiscountType, Entity as PromoCode, Model as PromoCodeModel,
};
pub use slot::{Column as SlotColumn, Entity as Slot, Model as SlotModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
