//! Procedural macros for tool declarations.
//!
//! `#[tool]` turns a plain function into a registry declaration: doc
//! comments become the tool description and each `#[param(...)]` attribute
//! becomes the parameter's annotation metadata.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, format_ident, quote};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Expr, ExprLit, FnArg, GenericArgument, Ident, ItemFn, Lit, LitStr, Meta, Pat,
    PathArguments, ReturnType, Token, Type, parse_macro_input,
};

/// Declares a function as a registry tool.
///
/// ```ignore
/// /// Adds one to `x`.
/// #[tool]
/// fn add_one(#[param("The input value", true)] x: i64) -> i64 {
///     x + 1
/// }
///
/// registry.register(add_one_tool())?;
/// ```
///
/// The function is kept as written and a sibling `<name>_tool()` function
/// returning a `tool_registry::ToolDeclaration` is generated. The tool name
/// defaults to the function name and can be overridden with
/// `#[tool(name = "...")]`. Generated code refers to the registry crate as
/// `::tool_registry`; re-exporting crates can point it elsewhere with
/// `#[tool(crate = "path::to::registry")]`.
///
/// Parameters are extracted from the call arguments by name; functions
/// returning `Result<T, E>` have their error propagated as a tool failure.
/// Result aliases with another name (`io::Result` works, `ToolResult<T>`
/// does not) need `#[tool(fallible)]`. Raw identifiers such as `r#type` are
/// advertised without their `r#` prefix. Annotation metadata is forwarded
/// verbatim and validated when the declaration is registered.
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut function = parse_macro_input!(item as ItemFn);

    let mut name: Option<LitStr> = None;
    let mut krate: Option<syn::Path> = None;
    let mut fallible = false;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("crate") {
            let path: LitStr = meta.value()?.parse()?;
            krate = Some(path.parse()?);
            Ok(())
        } else if meta.path.is_ident("fallible") {
            fallible = true;
            Ok(())
        } else {
            Err(meta.error(
                "unsupported tool property, expected `name`, `crate` or `fallible`",
            ))
        }
    });
    parse_macro_input!(attr with parser);

    let krate = krate.map_or_else(|| quote!(::tool_registry), |path| quote!(#path));
    match expand(&mut function, name, &krate, fallible) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct Param {
    ident: Ident,
    ty: Type,
    metadata: Option<Vec<Expr>>,
}

fn expand(
    function: &mut ItemFn,
    name: Option<LitStr>,
    krate: &TokenStream2,
    fallible: bool,
) -> syn::Result<TokenStream2> {
    let sig = &function.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "tools must be synchronous"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&sig.generics, "tools cannot be generic"));
    }

    let params = collect_params(function)?;
    let fn_ident = function.sig.ident.clone();
    let tool_name = name.map_or_else(|| fn_ident.unraw().to_string(), |lit| lit.value());
    let decl_ident = format_ident!("{}_tool", fn_ident);
    let vis = &function.vis;
    let decl_doc = format!("Registry declaration for the `{tool_name}` tool.");

    let doc_call = doc_text(&function.attrs).map(|doc| quote!(.doc(#doc)));
    let propagate = (fallible || returns_result(&function.sig.output)).then(|| quote!(?));

    let names: Vec<String> = params.iter().map(|p| p.ident.unraw().to_string()).collect();
    let idents: Vec<&Ident> = params.iter().map(|p| &p.ident).collect();
    let types: Vec<&Type> = params.iter().map(|p| &p.ty).collect();
    let decls: Vec<TokenStream2> = params
        .iter()
        .map(|param| param_decl(param, krate))
        .collect();

    Ok(quote! {
        #function

        #[doc = #decl_doc]
        #[must_use]
        #vis fn #decl_ident() -> #krate::ToolDeclaration {
            #krate::ToolDeclaration::new(
                #tool_name,
                |__args: &#krate::ToolArgs|
                    -> #krate::__private::anyhow::Result<#krate::__private::serde_json::Value> {
                    __args.deny_unknown(&[#(#names),*])?;
                    #(let #idents: #types = __args.get(#names)?;)*
                    let __output = #fn_ident(#(#idents),*) #propagate;
                    ::std::result::Result::Ok(#krate::__private::serde_json::to_value(__output)?)
                },
            )
            #doc_call
            #(.param(#decls))*
        }
    })
}

/// Reads parameters and strips their `#[param]` attributes from the function.
fn collect_params(function: &mut ItemFn) -> syn::Result<Vec<Param>> {
    let mut params = Vec::new();
    for input in &mut function.sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            return Err(syn::Error::new_spanned(input, "tools cannot take `self`"));
        };
        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return Err(syn::Error::new_spanned(
                &pat_type.pat,
                "tool parameters must be plain identifiers",
            ));
        };
        let ident = pat_ident.ident.clone();

        let mut metadata = None;
        let mut kept = Vec::with_capacity(pat_type.attrs.len());
        for attr in pat_type.attrs.drain(..) {
            if !attr.path().is_ident("param") {
                kept.push(attr);
                continue;
            }
            if metadata.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate `#[param]` attribute"));
            }
            metadata = Some(param_metadata(&attr)?);
        }
        pat_type.attrs = kept;

        params.push(Param {
            ident,
            ty: pat_type.ty.as_ref().clone(),
            metadata,
        });
    }
    Ok(params)
}

fn param_metadata(attr: &Attribute) -> syn::Result<Vec<Expr>> {
    match &attr.meta {
        Meta::Path(_) => Ok(Vec::new()),
        Meta::List(_) => Ok(attr
            .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)?
            .into_iter()
            .collect()),
        Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "expected `#[param(<description>, <required>)]`",
        )),
    }
}

fn param_decl(param: &Param, krate: &TokenStream2) -> TokenStream2 {
    let name = param.ident.unraw().to_string();
    match &param.metadata {
        None => quote!(#krate::ParamDecl::unannotated(#name)),
        Some(metadata) => {
            let shape = shape_tokens(&param.ty, krate);
            quote! {
                #krate::ParamDecl::annotated(
                    #name,
                    #krate::Annotation::new(#shape)
                        #(.with_meta(#krate::__private::serde_json::json!(#metadata)))*,
                )
            }
        }
    }
}

fn named(name: &str, krate: &TokenStream2) -> TokenStream2 {
    quote!(#krate::TypeShape::named(#name))
}

/// Mirrors a parameter type as a `TypeShape` constructor expression.
fn shape_tokens(ty: &Type, krate: &TokenStream2) -> TokenStream2 {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            let Some(segment) = path.path.segments.last() else {
                return named(&ty.to_token_stream().to_string(), krate);
            };
            let name = segment.ident.to_string();
            let PathArguments::AngleBracketed(generics) = &segment.arguments else {
                return named(&name, krate);
            };
            let args: Vec<TokenStream2> = generics
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(inner) => Some(shape_tokens(inner, krate)),
                    _ => None,
                })
                .collect();
            if args.is_empty() {
                named(&name, krate)
            } else {
                quote!(#krate::TypeShape::generic(#name, [#(#args),*]))
            }
        }
        Type::Tuple(tuple) if tuple.elems.is_empty() => named("()", krate),
        Type::Tuple(tuple) => {
            let elems = tuple.elems.iter().map(|elem| shape_tokens(elem, krate));
            quote!(#krate::TypeShape::tuple([#(#elems),*]))
        }
        Type::Array(array) => {
            let elem = shape_tokens(&array.elem, krate);
            let len = array.len.to_token_stream().to_string();
            quote!(#krate::TypeShape::array(#elem, #len))
        }
        Type::Paren(inner) => shape_tokens(&inner.elem, krate),
        Type::Group(inner) => shape_tokens(&inner.elem, krate),
        other => named(&other.to_token_stream().to_string(), krate),
    }
}

fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(pair) => match &pair.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    if lines.is_empty() {
        return None;
    }
    Some(
        lines
            .iter()
            .map(|line| line.strip_prefix(' ').unwrap_or(line.as_str()))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = ty.as_ref() else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Result")
}
