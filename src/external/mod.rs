pub mod notifier;
pub mod resend;
pub mod stripe;

pub use notifier::{AdminNotifier, LogNotifier, NotificationSink};
pub use resend::ResendMailer;
pub use stripe::{CheckoutParams, StripeService};
