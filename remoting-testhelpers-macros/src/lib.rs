use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    struct UntilFn {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    struct UntilBody {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct Body {
        items: BraceGroup,
    }

    struct FunctionDecl {
        until_fn: UntilFn, _fn: KFn, name: Ident,
        until_body: UntilBody, body: Body
    }
}

impl quote::ToTokens for UntilFn {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for UntilBody {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Body {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        tokens.extend(self.items.0.stream())
    }
}

/// Test attribute that installs the tracing subscriber and enters a span
/// named after the test before running it.
///
/// ```ignore
/// #[remoting_testhelpers::test]
/// fn round_trips() {
///     // logs from the codecs show up under `test{name="round_trips"}`
/// }
/// ```
///
/// Another test attribute can be passed as the argument, and is used instead
/// of `#[test]`:
///
/// ```ignore
/// #[remoting_testhelpers::test(tokio::test)]
/// async fn round_trips_async() {}
/// ```
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut i = item.to_token_iter();
    let fdecl = match i.parse::<FunctionDecl>() {
        Ok(fdecl) => fdecl,
        Err(err) => {
            let msg = format!("#[remoting_testhelpers::test] expects a function: {err}");
            return quote::quote! { ::core::compile_error!(#msg); }.into();
        }
    };

    let FunctionDecl {
        until_fn,
        _fn,
        name,
        until_body,
        body,
    } = fdecl;

    let test_attr = if attr.is_empty() {
        quote::quote! { #[::core::prelude::rust_2024::test] }
    } else {
        let attr = TokenStream::from(attr);
        quote::quote! { #[#attr] }
    };
    let test_name = name.to_string();

    quote::quote! {
        #test_attr
        #until_fn fn #name #until_body {
            ::remoting_testhelpers::setup();
            let _test_span = ::remoting_testhelpers::tracing::info_span!("test", name = #test_name).entered();

            #body
        }
    }
    .into()
}
