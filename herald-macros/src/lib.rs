use proc_macro::TokenStream;

mod event;
mod listener;

/// Derive macro for implementing the `Event` trait.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Event)]
/// struct OrderPlaced {
///     id: u64,
/// }
/// ```
#[proc_macro_derive(Event)]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}

/// Implement `Listener` for a type from an inherent `impl` block.
///
/// Every method in the block marked with `#[subscribe]` becomes a handler
/// descriptor, described exactly as written. Methods that do not have the
/// shape of a handler are rejected when the listener is registered.
///
/// # Example
///
/// ```rust,ignore
/// struct Mailer;
///
/// #[listener]
/// impl Mailer {
///     #[subscribe]
///     pub fn on_order(&self, event: &OrderPlaced) {
///         send_receipt(event.id);
///     }
///
///     // Not marked, not a handler.
///     pub fn flush(&self) {}
/// }
/// ```
#[proc_macro_attribute]
pub fn listener(attr: TokenStream, item: TokenStream) -> TokenStream {
    listener::listener_impl(attr, item)
}

/// Mark a method of a `#[listener]` impl block as a handler.
///
/// On its own this attribute only produces an error; it is consumed by
/// `#[listener]`.
#[proc_macro_attribute]
pub fn subscribe(attr: TokenStream, item: TokenStream) -> TokenStream {
    listener::subscribe_impl(attr, item)
}
