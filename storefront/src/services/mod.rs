// storefront/src/services/mod.rs

pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod coupon_service;
pub mod order_service;
pub mod payment_service;
pub mod profile_service;
pub mod study_service;

pub use cart_service::{AddedToCart, CartService, PendingRemoval};
pub use catalog_service::CatalogService;
pub use checkout_service::{CheckoutPhase, CheckoutService, CheckoutSession};
pub use coupon_service::{AppliedCoupon, CouponService, CouponVerdict};
pub use order_service::{OrderService, OrderTracking};
pub use payment_service::{PaymentPhase, PaymentProviders, PaymentService, PaymentSession};
pub use profile_service::{ProfileRefresher, ProfileService, RankedEntry, XpTracker};
pub use study_service::StudyService;
