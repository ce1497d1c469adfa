//! Command-related macros.
//!
//! This module contains:
//! - `#[command]` - Attribute macro generating a Handler and Command declaration

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    FnArg, GenericArgument, Ident, ItemFn, LitStr, Pat, PathArguments, ReturnType, Token, Type,
    bracketed,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Arguments for the `#[command]` macro.
pub(crate) struct CommandArgs {
    pub name: Option<LitStr>,
    pub aliases: Vec<LitStr>,
}

impl Parse for CommandArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut aliases = Vec::new();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    name = Some(input.parse()?);
                }
                "aliases" => {
                    let content;
                    bracketed!(content in input);
                    let list: Punctuated<LitStr, Token![,]> =
                        content.parse_terminated(|stream| stream.parse(), Token![,])?;
                    aliases.extend(list);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(CommandArgs { name, aliases })
    }
}

enum Kind {
    Required,
    Optional(Type),
    Remainder,
    Invocation,
}

/// Implementation of the `#[command]` macro.
pub fn command_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as CommandArgs);
    let input = parse_macro_input!(item as ItemFn);

    match expand(args, input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: CommandArgs, mut input: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let fn_name = input.sig.ident.clone();
    let fn_vis = &input.vis;
    let fn_block = &input.block;

    if input.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            input.sig.fn_token,
            "Command function must be async",
        ));
    }
    if let Some(param) = input.sig.generics.params.first() {
        return Err(syn::Error::new_spanned(
            param,
            "Command function cannot be generic",
        ));
    }

    let output_type = match &input.sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    let command_name = args
        .name
        .unwrap_or_else(|| LitStr::new(&fn_name.to_string(), fn_name.span()));
    let aliases = &args.aliases;

    let mut declarations = Vec::new();
    let mut extractions = Vec::new();
    let mut arg_names = Vec::new();
    let mut seen_invocation = false;

    let count = input.sig.inputs.len();
    for (i, arg) in input.sig.inputs.iter_mut().enumerate() {
        let pat_type = match arg {
            FnArg::Typed(pat_type) => pat_type,
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "Command function cannot have a self parameter",
                ));
            }
        };

        let before = pat_type.attrs.len();
        pat_type.attrs.retain(|attr| !attr.path().is_ident("rest"));
        let rest = pat_type.attrs.len() != before;

        let ty = (*pat_type.ty).clone();
        let kind = if is_invocation(&ty) {
            if rest {
                return Err(syn::Error::new_spanned(
                    &pat_type.ty,
                    "`#[rest]` cannot apply to the invocation",
                ));
            }
            if seen_invocation {
                return Err(syn::Error::new_spanned(
                    &pat_type.ty,
                    "Command function takes at most one `Invocation`",
                ));
            }
            seen_invocation = true;
            Kind::Invocation
        } else if rest {
            if i + 1 != count {
                return Err(syn::Error::new_spanned(
                    &pat_type.pat,
                    "`#[rest]` parameter must be the last one",
                ));
            }
            Kind::Remainder
        } else if let Some(inner) = option_inner(&ty) {
            Kind::Optional(inner)
        } else {
            Kind::Required
        };

        let arg_name = Ident::new(&format!("__arg_{}", i), Span::call_site());
        arg_names.push(arg_name.clone());

        if let Kind::Invocation = kind {
            continue;
        }

        let param_name = match &*pat_type.pat {
            Pat::Ident(pat_ident) => LitStr::new(&pat_ident.ident.to_string(), pat_ident.ident.span()),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "Command parameters must be plain identifiers",
                ));
            }
        };

        match kind {
            Kind::Required => {
                declarations.push(quote! {
                    .parameter(::parley::Parameter::of::<#ty>(#param_name))
                });
                extractions.push(quote! {
                    let #arg_name: #ty = __invocation.arguments.require::<#ty>(#param_name)?;
                });
            }
            Kind::Remainder => {
                declarations.push(quote! {
                    .parameter(::parley::Parameter::of::<#ty>(#param_name).remainder())
                });
                extractions.push(quote! {
                    let #arg_name: #ty = __invocation.arguments.require::<#ty>(#param_name)?;
                });
            }
            Kind::Optional(inner) => {
                declarations.push(quote! {
                    .parameter(::parley::Parameter::of::<#inner>(#param_name).optional())
                });
                extractions.push(quote! {
                    let #arg_name: #ty = __invocation.arguments.take::<#inner>(#param_name);
                });
            }
            Kind::Invocation => {}
        }
    }

    // the invocation is moved last, after every argument is taken out
    let invocation_binding = input
        .sig
        .inputs
        .iter()
        .zip(&arg_names)
        .find_map(|(arg, name)| match arg {
            FnArg::Typed(pat_type) if is_invocation(&pat_type.ty) => {
                Some(quote! { let #name = __invocation; })
            }
            _ => None,
        });

    let docs = input.attrs.iter().filter(|attr| attr.path().is_ident("doc"));
    let inner_inputs = &input.sig.inputs;
    let struct_doc = format!(
        "Auto-generated Handler from `#[parley::command]` on `{}`",
        fn_name
    );

    Ok(quote! {
        #(#docs)*
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Default)]
        #[doc = #struct_doc]
        #fn_vis struct #fn_name;

        impl #fn_name {
            /// The declared command name.
            pub const NAME: &'static str = #command_name;

            /// Build the command declaration for this handler.
            pub fn command() -> ::core::result::Result<::parley::Command, ::parley::BuildError> {
                ::parley::Command::builder(#command_name)
                    #(.alias(#aliases))*
                    #(#declarations)*
                    .handler(#fn_name)
                    .build()
            }
        }

        impl ::parley::Handler for #fn_name {
            type Output = ::core::result::Result<#output_type, ::parley::ArgumentError>;

            #[allow(unused_mut)]
            async fn call(&self, mut __invocation: ::parley::Invocation) -> Self::Output {
                #(#extractions)*
                #invocation_binding
                async fn __inner(#inner_inputs) -> #output_type {
                    #fn_block
                }
                ::core::result::Result::Ok(__inner(#(#arg_names),*).await)
            }
        }
    })
}

fn is_invocation(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Invocation"),
        _ => false,
    }
}

fn option_inner(ty: &Type) -> Option<Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(generics) = &segment.arguments else {
        return None;
    };
    match generics.args.first()? {
        GenericArgument::Type(inner) => Some(inner.clone()),
        _ => None,
    }
}
