// Message dispatch — trait-based abstraction over the email provider.
//
// The Dispatcher trait is all the pipeline knows about sending. Mailgun is
// the production implementation; tests plug in recording doubles. Pacing
// and retry live here too since every sender needs them.

pub mod mailgun;
pub mod rate_limiter;
pub mod retry;
pub mod traits;

pub use traits::Dispatcher;
