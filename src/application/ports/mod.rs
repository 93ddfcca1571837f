pub mod outbound;

pub use outbound::{
    BalanceTransaction, Charge, Customer, Mailer, NewBalanceTransaction, PaymentIntent,
    PaymentProvider, ProviderError, ProviderResult, Refund,
};
