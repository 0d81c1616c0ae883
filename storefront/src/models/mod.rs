// storefront/src/models/mod.rs

//! Rows owned by the remote store backend. The client only holds transient
//! copies; field names follow the backend's column names.

pub mod cart_item;
pub mod coupon;
pub mod order;
pub mod order_item;
pub mod product;
pub mod status_history;
pub mod study;
pub mod user_profile;

pub use cart_item::{CartLine, CartRow, NewCartRow};
pub use coupon::{Coupon, CouponValidation, DiscountType};
pub use order::{
  AddressError, NewOrder, Order, OrderStatus, OrderUpdate, PaymentMethod, PaymentStatus, ShippingAddress,
};
pub use order_item::{NewOrderItem, OrderItem};
pub use product::{ApprovalStatus, Product, ProductCategory};
pub use status_history::{NewStatusHistory, OrderStatusHistory};
pub use study::{Batch, Institute, StudyMaterial};
pub use user_profile::{LeaderboardEntry, ProfileUpdate, UserProfile};
