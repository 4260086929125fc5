//! User context attached to generation requests

mod aggregator;
mod render;
mod slot;

pub use aggregator::{
    ContextAggregator, ContextSource, EMAIL_LIMIT, INSIGHT_LIMIT, UserContext, WEBSITE_LIMIT,
};
pub use slot::{ContextHandle, ContextSlot, context_slot};
