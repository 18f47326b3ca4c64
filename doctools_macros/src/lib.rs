//! Procedural macros for **doctools**
#![forbid(unsafe_code)]

use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use proc_macro_crate::{crate_name, FoundCrate};
use proc_macro_error::{abort, proc_macro_error};
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Expr, ExprLit, FnArg, GenericArgument, ItemFn, Lit, LitStr,
    Meta, Pat, PatIdent, PatType, PathArguments, Type, TypePath,
};

fn get_crate_path() -> (proc_macro2::TokenStream, String) {
    for candidate in ["doctools", "doctools_core"] {
        match crate_name(candidate) {
            Ok(FoundCrate::Itself) => return (quote!(crate), "crate".to_owned()),
            Ok(FoundCrate::Name(name)) => {
                let ident = Ident::new(&name, Span::call_site());
                return (quote!(::#ident), format!("::{name}"));
            }
            Err(_) => continue,
        }
    }
    (quote!(::doctools), "::doctools".to_owned())
}

fn is_option_type(ty: &Type) -> bool {
    option_inner(ty).is_some()
}

/// `T` for `Option<T>`, `std::option::Option<T>` or `core::option::Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };

    let idents: Vec<_> = path.segments.iter().map(|s| &s.ident).collect();
    let is_option = match idents.as_slice() {
        [ident] => *ident == "Option",
        [first, second, ident] => {
            (*first == "std" || *first == "core") && *second == "option" && *ident == "Option"
        }
        _ => false,
    };
    if !is_option {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &path.segments.last()?.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Type tag the schema compiler understands for a parameter's Rust type.
fn type_tag(ty: &Type) -> &'static str {
    if let Some(inner) = option_inner(ty) {
        return type_tag(inner);
    }
    match ty {
        Type::Paren(p) => type_tag(&p.elem),
        Type::Group(g) => type_tag(&g.elem),
        Type::Array(_) | Type::Slice(_) | Type::Tuple(_) => "list",
        Type::Path(TypePath { path, .. }) => {
            let Some(last) = path.segments.last() else {
                return "str";
            };
            match last.ident.to_string().as_str() {
                "String" | "str" | "char" | "PathBuf" => "str",
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "u128" | "usize" => "int",
                "f32" | "f64" => "float",
                "bool" => "bool",
                "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => "list",
                _ => "dict",
            }
        }
        _ => "str",
    }
}

/// Gather `///` doc-comments into a single string, trimming the leading space after `///`.
fn docs(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|a| match &a.meta {
            Meta::NameValue(nv) if a.path().is_ident("doc") => {
                if let Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) = &nv.value
                {
                    Some(s.value().trim_start().to_owned())
                } else {
                    None
                }
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Expose a function as a tool.
///
/// The doc comment is the tool documentation: a summary line followed by
/// `:param <name>: <type>: <description>` sections. The function may be
/// `async`; its return value must implement `IntoToolOutput`.
#[proc_macro_error]
#[proc_macro_attribute]
pub fn tool(_attr: TokenStream, item: TokenStream) -> TokenStream {
    // ───────── Parse the user function ─────────
    let func: ItemFn = parse_macro_input!(item);
    let fn_name = &func.sig.ident;
    let fn_name_str = fn_name.to_string();
    let doc_lit = LitStr::new(&docs(&func.attrs), Span::call_site());

    if !func.sig.generics.params.is_empty() {
        abort!(func.sig.generics, "`#[tool]` functions cannot be generic");
    }

    // ───────── Inputs → wrapper struct fields ─────────
    let (idents, types): (Vec<_>, Vec<_>) = func
        .sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Typed(PatType { pat, ty, .. }) => {
                let Pat::Ident(PatIdent { ident, .. }) = &**pat else {
                    abort!(pat, "`#[tool]` supports only identifier patterns");
                };
                if matches!(&**ty, Type::Reference(_)) {
                    abort!(ty, "`#[tool]` parameters must be owned types");
                }
                (ident.clone(), (**ty).clone())
            }
            FnArg::Receiver(_) => abort!(arg, "`#[tool]` may not be used on `self` methods"),
        })
        .unzip();

    let param_names: Vec<String> = idents
        .iter()
        .map(|i| i.to_string().trim_start_matches("r#").to_owned())
        .collect();
    let type_tags: Vec<&str> = types.iter().map(type_tag).collect();
    let optional: Vec<proc_macro2::TokenStream> = types
        .iter()
        .map(|ty| {
            if is_option_type(ty) {
                quote!(#[serde(default)])
            } else {
                quote!()
            }
        })
        .collect();

    let await_call = if func.sig.asyncness.is_some() {
        quote!(.await)
    } else {
        quote!()
    };

    // ───────── Generated helper idents ─────────
    let wrapper_ident = Ident::new(&format!("__TOOL_INPUT_{fn_name}"), Span::call_site());
    let (crate_path, crate_path_str) = get_crate_path();
    let serde_path = LitStr::new(
        &format!("{crate_path_str}::__private::serde"),
        Span::call_site(),
    );

    // ───────── Macro expansion ─────────
    TokenStream::from(quote! {
        #func

        #[allow(non_camel_case_types)]
        #[derive(#crate_path::__private::serde::Deserialize)]
        #[serde(crate = #serde_path)]
        struct #wrapper_ident { #( #optional #idents : #types ),* }

        #crate_path::__private::inventory::submit! {
            #crate_path::ToolRegistration::new(
                #fn_name_str,
                #doc_lit,
                &[ #( (#param_names, #type_tags) ),* ],
                |v| ::std::boxed::Box::pin(async move {
                    let arg: #wrapper_ident =
                        #crate_path::__private::serde_json::from_value(v)
                            .map_err(#crate_path::DeserializationError::from)?;
                    let out = #fn_name( #( arg.#idents ),* ) #await_call;
                    #crate_path::IntoToolOutput::into_output(out)
                }),
            )
        }
    })
}
