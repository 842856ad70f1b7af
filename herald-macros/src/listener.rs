//! Listener-related macros.
//!
//! This module contains:
//! - `#[listener]` - Implements `Listener` from an inherent impl block
//! - `#[subscribe]` - Marks handler methods inside such a block
//!
//! `#[listener]` describes each marked method faithfully instead of rejecting
//! malformed ones at compile time; registration applies the handler rules.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2, TokenTree};
use quote::quote;
use syn::{
    Attribute, FnArg, ImplItem, ImplItemFn, ItemImpl, ReturnType, Type, Visibility,
    parse_macro_input,
};

/// Implementation of the `#[listener]` attribute macro.
pub fn listener_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(Span::call_site(), "#[listener] takes no arguments")
            .to_compile_error()
            .into();
    }

    let mut input = parse_macro_input!(item as ItemImpl);

    if let Some((_, path, _)) = &input.trait_ {
        return syn::Error::new_spanned(
            path,
            "#[listener] must be applied to an inherent impl block",
        )
        .to_compile_error()
        .into();
    }

    let mut descriptors = Vec::new();
    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        match take_subscribe(&mut method.attrs) {
            Ok(true) => descriptors.push(describe(method)),
            Ok(false) => {}
            Err(err) => return err.to_compile_error().into(),
        }
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        #input

        impl #impl_generics ::herald::Listener for #self_ty #where_clause {
            fn handler_methods() -> ::std::vec::Vec<::herald::HandlerMethod<Self>> {
                ::std::vec![#(#descriptors),*]
            }
        }
    };

    TokenStream::from(expanded)
}

/// Implementation of the `#[subscribe]` attribute macro.
///
/// Only reached when the attribute is not inside a `#[listener]` block.
pub fn subscribe_impl(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    let error = syn::Error::new(
        Span::call_site(),
        "#[subscribe] can only mark methods inside a #[listener] impl block",
    )
    .to_compile_error();

    TokenStream::from(quote! {
        #error
        #item
    })
}

fn is_subscribe(attr: &Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "subscribe")
}

/// Removes `#[subscribe]` markers, reporting whether there was one.
fn take_subscribe(attrs: &mut Vec<Attribute>) -> syn::Result<bool> {
    let mut found = false;
    let mut error = None;
    attrs.retain(|attr| {
        if !is_subscribe(attr) {
            return true;
        }
        if attr.meta.require_path_only().is_err() {
            error = Some(syn::Error::new_spanned(attr, "#[subscribe] takes no arguments"));
        }
        found = true;
        false
    });
    match error {
        Some(err) => Err(err),
        None => Ok(found),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ReceiverKind {
    Shared,
    Exclusive,
    Owned,
    None,
}

impl ReceiverKind {
    fn of(method: &ImplItemFn) -> Self {
        match method.sig.receiver() {
            None => ReceiverKind::None,
            Some(receiver) if receiver.reference.is_none() => ReceiverKind::Owned,
            Some(receiver) if receiver.mutability.is_some() => ReceiverKind::Exclusive,
            Some(_) => ReceiverKind::Shared,
        }
    }

    fn variant(self) -> TokenStream2 {
        match self {
            ReceiverKind::Shared => quote!(::herald::Receiver::Shared),
            ReceiverKind::Exclusive => quote!(::herald::Receiver::Exclusive),
            ReceiverKind::Owned => quote!(::herald::Receiver::Owned),
            ReceiverKind::None => quote!(::herald::Receiver::None),
        }
    }
}

/// The shape of one non-receiver parameter.
struct ParamShape {
    text: String,
    by_ref: bool,
    concrete: bool,
    /// The referenced type for `&T`, the type itself otherwise.
    inner: Type,
}

impl ParamShape {
    fn of(ty: &Type, generic_method: bool) -> Self {
        let (by_ref, inner) = match ty {
            Type::Reference(reference) if reference.mutability.is_none() => {
                (true, (*reference.elem).clone())
            }
            _ => (false, ty.clone()),
        };
        let concrete = !generic_method && is_closed(quote!(#inner));

        Self {
            text: type_text(ty),
            by_ref,
            concrete,
            inner,
        }
    }

    fn descriptor(&self) -> TokenStream2 {
        let text = &self.text;
        let by_ref = self.by_ref;
        let concrete = self.concrete;
        let inner = &self.inner;

        // The probe names the type outside the method, which is only
        // possible for closed types.
        let event = if concrete {
            quote! {
                {
                    #[allow(unused_imports)]
                    use ::herald::__private::{ViaAny as _, ViaEvent as _};
                    (&&::herald::__private::HandlerProbe::<Self, #inner>::new()).event_kind()
                }
            }
        } else {
            quote!(::core::option::Option::None)
        };

        quote! {
            ::herald::Param {
                ty: #text,
                by_ref: #by_ref,
                concrete: #concrete,
                event: #event,
            }
        }
    }
}

/// Builds the `HandlerMethod` expression for a marked method.
fn describe(method: &ImplItemFn) -> TokenStream2 {
    let sig = &method.sig;
    let ident = &sig.ident;
    let name = ident.to_string();

    let visibility = match &method.vis {
        Visibility::Public(_) => quote!(::herald::Visibility::Public),
        Visibility::Restricted(_) => quote!(::herald::Visibility::Restricted),
        Visibility::Inherited => quote!(::herald::Visibility::Private),
    };

    let receiver = ReceiverKind::of(method);
    let receiver_variant = receiver.variant();

    let returns = if sig.asyncness.is_some() {
        quote!(::herald::Returns::Future)
    } else {
        match &sig.output {
            ReturnType::Default => quote!(::herald::Returns::Unit),
            ReturnType::Type(_, ty) if is_unit(ty) => quote!(::herald::Returns::Unit),
            ReturnType::Type(_, ty) => {
                let text = type_text(ty);
                quote!(::herald::Returns::Value(#text))
            }
        }
    };

    let generic_method =
        sig.generics.type_params().next().is_some() || sig.generics.const_params().next().is_some();

    let params: Vec<ParamShape> = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat_type) => Some(ParamShape::of(&pat_type.ty, generic_method)),
            FnArg::Receiver(_) => None,
        })
        .collect();
    let param_descriptors = params.iter().map(ParamShape::descriptor);

    let invoker = match params.as_slice() {
        [param]
            if receiver == ReceiverKind::Shared
                && sig.asyncness.is_none()
                && param.by_ref
                && param.concrete =>
        {
            let inner = &param.inner;
            quote! {
                {
                    #[allow(unused_imports)]
                    use ::herald::__private::{ViaAny as _, ViaEvent as _};
                    (&&::herald::__private::HandlerProbe::<Self, #inner>::new()).invoker(
                        |this: &Self, event: &#inner| {
                            let _ = Self::#ident(this, event);
                        },
                    )
                }
            }
        }
        _ => quote!(::core::option::Option::None),
    };

    quote! {
        ::herald::HandlerMethod::new(
            ::herald::HandlerSignature {
                name: #name,
                visibility: #visibility,
                receiver: #receiver_variant,
                returns: #returns,
                params: ::std::vec![#(#param_descriptors),*],
            },
            #invoker,
        )
    }
}

fn is_unit(ty: &Type) -> bool {
    match ty {
        Type::Tuple(tuple) => tuple.elems.is_empty(),
        Type::Paren(paren) => is_unit(&paren.elem),
        _ => false,
    }
}

/// `false` when the type mentions `impl`, `dyn`, `_` or a lifetime other
/// than `'static`.
fn is_closed(tokens: TokenStream2) -> bool {
    let mut tokens = tokens.into_iter();
    while let Some(token) = tokens.next() {
        match token {
            TokenTree::Ident(ident) if ident == "impl" || ident == "dyn" || ident == "_" => {
                return false;
            }
            TokenTree::Punct(punct) if punct.as_char() == '\'' => match tokens.next() {
                Some(TokenTree::Ident(lifetime)) if lifetime == "static" => {}
                _ => return false,
            },
            TokenTree::Group(group) if !is_closed(group.stream()) => return false,
            _ => {}
        }
    }
    true
}

fn type_text(ty: &Type) -> String {
    quote!(#ty)
        .to_string()
        .replace("& ", "&")
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn closed_types() {
        assert!(is_closed(quote!(Ping)));
        assert!(is_closed(quote!(events::Ping<u8>)));
        assert!(is_closed(quote!(Wrapper<&'static str>)));
        assert!(!is_closed(quote!(dyn Event)));
        assert!(!is_closed(quote!(impl Event)));
        assert!(!is_closed(quote!(Vec<_>)));
        assert!(!is_closed(quote!(Borrowed<'a>)));
        assert!(!is_closed(quote!(Box<dyn Event>)));
    }

    #[test]
    fn param_shapes() {
        let shape = ParamShape::of(&parse_quote!(&Ping), false);
        assert!(shape.by_ref && shape.concrete);
        assert_eq!(shape.text, "&Ping");

        let shape = ParamShape::of(&parse_quote!(Ping), false);
        assert!(!shape.by_ref && shape.concrete);

        let shape = ParamShape::of(&parse_quote!(&mut Ping), false);
        assert!(!shape.by_ref);

        let shape = ParamShape::of(&parse_quote!(&dyn Event), false);
        assert!(shape.by_ref && !shape.concrete);

        let shape = ParamShape::of(&parse_quote!(&Ping), true);
        assert!(!shape.concrete);
    }

    #[test]
    fn unit_returns() {
        assert!(is_unit(&parse_quote!(())));
        assert!(is_unit(&parse_quote!((()))));
        assert!(!is_unit(&parse_quote!(i32)));
        assert!(!is_unit(&parse_quote!((i32,))));
    }

    #[test]
    fn subscribe_markers_are_removed() {
        let mut method: ImplItemFn = parse_quote! {
            #[subscribe]
            #[inline]
            pub fn on_ping(&self, event: &Ping) {}
        };
        assert!(take_subscribe(&mut method.attrs).unwrap());
        assert_eq!(method.attrs.len(), 1);
        assert!(!take_subscribe(&mut method.attrs).unwrap());

        let mut method: ImplItemFn = parse_quote! {
            #[herald::subscribe(priority = 1)]
            pub fn on_ping(&self, event: &Ping) {}
        };
        assert!(take_subscribe(&mut method.attrs).is_err());
    }

    #[test]
    fn receivers() {
        let shared: ImplItemFn = parse_quote!(pub fn a(&self, e: &Ping) {});
        let exclusive: ImplItemFn = parse_quote!(pub fn a(&mut self, e: &Ping) {});
        let owned: ImplItemFn = parse_quote!(pub fn a(self, e: &Ping) {});
        let none: ImplItemFn = parse_quote!(pub fn a(e: &Ping) {});

        assert!(ReceiverKind::of(&shared) == ReceiverKind::Shared);
        assert!(ReceiverKind::of(&exclusive) == ReceiverKind::Exclusive);
        assert!(ReceiverKind::of(&owned) == ReceiverKind::Owned);
        assert!(ReceiverKind::of(&none) == ReceiverKind::None);
    }
}
