//! Implementation of `#[derive(Codec)]`.
//!
//! Generates a `Composite` field table and a `Codec` impl that walks the
//! fields in declaration order through `remoting::composite`.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, quote_spanned};
use unsynn::*;

keyword! {
    KStruct = "struct";
    KEnum = "enum";
    KPub = "pub";
    KRemoting = "remoting";
}

operator! {
    Eq = "=";
}

unsynn! {
    /// Visibility: `pub` or nothing
    enum Vis {
        PubIn(Cons<KPub, ParenthesisGroup>),
        Pub(KPub),
    }

    /// An attribute: `#[...]`
    struct Attribute {
        _pound: Pound,
        content: BracketGroup,
    }

    enum DeriveInput {
        Struct(StructDef),
        Enum(EnumDef),
    }

    struct StructDef {
        attrs: Vec<Attribute>,
        vis: Option<Vis>,
        _kw_struct: KStruct,
        name: Ident,
        body: StructBody,
    }

    /// Struct body - braces with fields, parentheses, or semicolon for unit struct
    enum StructBody {
        Named(BraceGroupContaining<CommaDelimitedVec<StructField>>),
        Tuple(Cons<ParenthesisGroup, Semicolon>),
        Unit(Semicolon),
    }

    struct StructField {
        attrs: Vec<Attribute>,
        vis: Option<Vis>,
        name: Ident,
        _colon: Colon,
        ty: FieldType,
    }

    /// Field type - collect tokens until comma
    struct FieldType {
        tokens: Any<Cons<Except<Comma>, TokenTree>>,
    }

    struct EnumDef {
        attrs: Vec<Attribute>,
        vis: Option<Vis>,
        _kw_enum: KEnum,
        name: Ident,
        body: BraceGroup,
    }

    /// `remoting(key = "value", ...)`
    struct RemotingAttr {
        _kw: KRemoting,
        args: ParenthesisGroupContaining<CommaDelimitedVec<AttrArg>>,
    }

    struct AttrArg {
        key: Ident,
        _eq: Eq,
        value: LiteralString,
    }
}

impl quote::ToTokens for FieldType {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        self.tokens.to_tokens(tokens)
    }
}

/// An error with the span it should be reported at.
struct SpannedError {
    span: Span,
    message: String,
}

impl SpannedError {
    fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    fn into_compile_error(self) -> TokenStream2 {
        let message = self.message;
        quote_spanned! { self.span =>
            ::core::compile_error!(#message);
        }
    }
}

/// What `#[remoting(...)]` says about one field.
#[derive(Default)]
struct FieldOptions {
    namespace: Option<String>,
    rename: Option<String>,
}

fn is_remoting_attr(attr: &Attribute) -> bool {
    matches!(
        attr.content.0.stream().into_iter().next(),
        Some(proc_macro2::TokenTree::Ident(ident)) if ident == "remoting"
    )
}

fn first_span(attr: &Attribute) -> Span {
    attr.content
        .0
        .stream()
        .into_iter()
        .next()
        .map(|t| t.span())
        .unwrap_or_else(Span::call_site)
}

fn parse_field_options(attrs: &[Attribute]) -> std::result::Result<FieldOptions, SpannedError> {
    let mut options = FieldOptions::default();

    for attr in attrs.iter().filter(|attr| is_remoting_attr(attr)) {
        let stream = attr.content.0.stream();
        let mut iter = stream.to_token_iter();
        let parsed: RemotingAttr = iter.parse().map_err(|e| {
            SpannedError::new(
                first_span(attr),
                format!("expected `remoting(key = \"value\", ...)`: {e}"),
            )
        })?;
        if let Some(extra) = iter.next() {
            return Err(SpannedError::new(
                extra.span(),
                "unexpected tokens after `remoting(...)`",
            ));
        }

        for arg in parsed.args.content.iter() {
            let arg = &arg.value;
            let key = arg.key.to_string();
            let slot = match key.as_str() {
                "namespace" => &mut options.namespace,
                "rename" => &mut options.rename,
                _ => {
                    return Err(SpannedError::new(
                        arg.key.span(),
                        format!(
                            "unknown remoting attribute `{key}`, expected `namespace` or `rename`"
                        ),
                    ));
                }
            };
            if slot.is_some() {
                return Err(SpannedError::new(
                    arg.key.span(),
                    format!("duplicate remoting attribute `{key}`"),
                ));
            }
            let value = arg.value.as_str().to_string();
            if key == "namespace" && value.is_empty() {
                return Err(SpannedError::new(
                    arg.key.span(),
                    "namespace URI must not be empty",
                ));
            }
            *slot = Some(value);
        }
    }

    Ok(options)
}

/// Name a field travels under when it is not renamed.
fn wire_name(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

struct FieldPlan<'a> {
    ident: &'a Ident,
    ty: &'a FieldType,
    wire_name: String,
    namespace: Option<String>,
}

fn process_struct(def: &StructDef) -> std::result::Result<TokenStream2, SpannedError> {
    if let Some(attr) = def.attrs.iter().find(|attr| is_remoting_attr(attr)) {
        return Err(SpannedError::new(
            first_span(attr),
            "`#[remoting(...)]` goes on fields, not on the struct",
        ));
    }

    let name = &def.name;
    let fields: Vec<FieldPlan<'_>> = match &def.body {
        StructBody::Named(fields) => fields
            .content
            .iter()
            .map(|field| {
                let field = &field.value;
                let options = parse_field_options(&field.attrs)?;
                Ok(FieldPlan {
                    ident: &field.name,
                    ty: &field.ty,
                    wire_name: options.rename.unwrap_or_else(|| wire_name(&field.name)),
                    namespace: options.namespace,
                })
            })
            .collect::<std::result::Result<_, SpannedError>>()?,
        StructBody::Tuple(_) => {
            return Err(SpannedError::new(
                name.span(),
                "Codec can only be derived for structs with named fields",
            ));
        }
        StructBody::Unit(_) => Vec::new(),
    };

    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.wire_name == field.wire_name) {
            return Err(SpannedError::new(
                field.ident.span(),
                format!("two fields travel under the name `{}`", field.wire_name),
            ));
        }
    }

    let field_table = fields.iter().map(|f| {
        let wire_name = &f.wire_name;
        match &f.namespace {
            Some(uri) => quote! { ::remoting::Field::namespaced(#wire_name, #uri) },
            None => quote! { ::remoting::Field::new(#wire_name) },
        }
    });

    let ser_fields = fields.iter().enumerate().map(|(idx, f)| {
        let ident = f.ident;
        quote! {
            ::remoting::composite::serialize_field(
                writer,
                &<Self as ::remoting::Composite>::FIELDS[#idx],
                &self.#ident,
            )?;
        }
    });

    let de_fields = fields.iter().enumerate().map(|(idx, f)| {
        let ident = f.ident;
        let ty = f.ty;
        quote! {
            #ident: ::remoting::composite::deserialize_field::<_, #ty>(
                reader,
                &<Self as ::remoting::Composite>::FIELDS[#idx],
            )?,
        }
    });

    let (writer, reader) = if fields.is_empty() {
        (quote! { _ }, quote! { _ })
    } else {
        (quote! { writer }, quote! { reader })
    };

    Ok(quote! {
        #[automatically_derived]
        impl ::remoting::Composite for #name {
            const FIELDS: &'static [::remoting::Field] = &[#(#field_table),*];
        }

        #[automatically_derived]
        impl ::remoting::Codec for #name {
            const KIND: ::remoting::WireKind = ::remoting::WireKind::Struct;

            fn serialize<__W: ::remoting::WireWriter + ?::core::marker::Sized>(
                &self,
                name: &str,
                writer: &mut __W,
            ) -> ::core::result::Result<(), ::remoting::SerializeError<__W::Error>> {
                ::remoting::composite::serialize_struct(name, writer, |#writer| {
                    #(#ser_fields)*
                    ::core::result::Result::Ok(())
                })
            }

            fn deserialize<'__de, __R: ::remoting::WireReader<'__de> + ?::core::marker::Sized>(
                name: &str,
                reader: &mut __R,
            ) -> ::core::result::Result<Self, ::remoting::DeserializeError<__R::Error>> {
                ::remoting::composite::deserialize_struct(name, reader, |#reader| {
                    ::core::result::Result::Ok(Self {
                        #(#de_fields)*
                    })
                })
            }
        }
    })
}

pub fn derive_codec(input: TokenStream) -> TokenStream {
    let input2 = TokenStream2::from(input);
    let mut iter = input2.to_token_iter();

    let parsed: DeriveInput = match iter.parse() {
        Ok(i) => i,
        Err(e) => {
            let msg = format!("Codec can only be derived for non-generic structs: {e}");
            return quote! { ::core::compile_error!(#msg); }.into();
        }
    };

    let expanded = match parsed {
        DeriveInput::Struct(def) => process_struct(&def),
        DeriveInput::Enum(def) => Err(SpannedError::new(
            def.name.span(),
            "Codec cannot be derived for enums; only composites have a wire form",
        )),
    };

    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
