use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Expr, ExprLit, FnArg, GenericArgument, ItemFn, Lit, LitStr, Meta, Pat, PathArguments, Token, Type};

/// Marks a function as a command.
///
/// # Usage
///
/// ```ignore
/// /// Greets someone by name.
/// #[command]
/// pub fn greet(first_name: String, #[arg(default = "Bond")] last_name: String) -> String {
///     format!("Hello {} {}", first_name, last_name)
/// }
///
/// #[command("add")]
/// fn add_numbers(a: i64, b: i64) -> i64 {
///     a + b
/// }
///
/// #[command(name = "wait")]
/// async fn wait_for(seconds: u64) {
///     tokio::time::sleep(std::time::Duration::from_secs(seconds)).await;
/// }
/// ```
///
/// The function is emitted unchanged and stays callable as usual. Alongside
/// it this generates:
///
/// ```ignore
/// #[doc(hidden)]
/// fn __cmdfns_invoke_greet(mut __args: cmdfns::Arguments) -> cmdfns::CommandResult {
///     let __cmdfns_arg_0: String = __args.take("first_name")?;
///     let __cmdfns_arg_1: String = __args.take("last_name")?;
///     cmdfns::IntoOutput::into_output(greet(__cmdfns_arg_0, __cmdfns_arg_1))
/// }
///
/// #[distributed_slice(cmdfns::command::MARKED_COMMANDS)]
/// static __CMDFNS_COMMAND_GREET: cmdfns::CommandDef = cmdfns::CommandDef { /* ... */ };
/// ```
///
/// Parameter types decide coercion: integer types are `int`, `f32`/`f64`
/// are `float`, `bool` is `bool`, everything else receives the raw token.
/// `Option<T>` parameters are optional and `Vec<T>` as the last parameter
/// collects any remaining positional tokens.
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = parse_macro_input!(attr as CommandAttr);
    let input = parse_macro_input!(item as ItemFn);

    match expand(attr, input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// `#[command]`, `#[command("name")]` or `#[command(name = "name")]`
struct CommandAttr {
    name: Option<LitStr>,
}

impl Parse for CommandAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Self { name: None });
        }
        if input.peek(LitStr) {
            return Ok(Self {
                name: Some(input.parse()?),
            });
        }

        let key = input.call(syn::Ident::parse_any)?;
        if key != "name" {
            return Err(syn::Error::new(
                key.span(),
                "expected `name = \"...\"` or a string literal",
            ));
        }
        input.parse::<Token![=]>()?;
        Ok(Self {
            name: Some(input.parse()?),
        })
    }
}

enum Shape {
    Plain,
    Optional,
    Variadic,
}

struct Param {
    name: String,
    ty: Type,
    shape: Shape,
    declared_type: TokenStream2,
    default: Option<String>,
}

fn expand(attr: CommandAttr, mut input: ItemFn) -> syn::Result<TokenStream2> {
    let sig = &input.sig;
    let fn_name = sig.ident.clone();

    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "#[command] functions cannot be generic",
        ));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new(variadic.span(), "#[command] functions cannot be C-variadic"));
    }

    let command_name = match &attr.name {
        Some(lit) => lit.value(),
        None => fn_name.unraw().to_string(),
    };
    let name_span = attr.name.as_ref().map(|l| l.span()).unwrap_or_else(|| fn_name.span());
    if command_name == "help" {
        return Err(syn::Error::new(name_span, "'help' is reserved and cannot be a command name"));
    }
    if command_name.is_empty() || command_name.chars().any(char::is_whitespace) {
        return Err(syn::Error::new(name_span, "command names must be non-empty and contain no whitespace"));
    }

    let params = collect_params(&mut input)?;
    let doc = doc_text(&input.attrs);
    let is_async = input.sig.asyncness.is_some();

    let invoke_fn = format_ident!("__cmdfns_invoke_{}", fn_name.unraw());
    let static_name = format_ident!("__CMDFNS_COMMAND_{}", fn_name.unraw().to_string().to_uppercase());

    let locals: Vec<_> = (0..params.len()).map(|i| format_ident!("__cmdfns_arg_{}", i)).collect();
    let takes = params.iter().zip(&locals).map(|(param, local)| {
        let name = &param.name;
        let ty = &param.ty;
        let take = match param.shape {
            Shape::Plain => quote!(take),
            Shape::Optional => quote!(take_optional),
            Shape::Variadic => quote!(take_variadic),
        };
        quote! {
            let #local: #ty = __args.#take(#name)?;
        }
    });

    let invoke = if is_async {
        quote! {
            #[doc(hidden)]
            fn #invoke_fn(mut __args: ::cmdfns::Arguments) -> ::cmdfns::CommandFuture {
                ::std::boxed::Box::pin(async move {
                    #(#takes)*
                    ::cmdfns::IntoOutput::into_output(#fn_name(#(#locals),*).await)
                })
            }
        }
    } else {
        quote! {
            #[doc(hidden)]
            fn #invoke_fn(mut __args: ::cmdfns::Arguments) -> ::cmdfns::CommandResult {
                #(#takes)*
                ::cmdfns::IntoOutput::into_output(#fn_name(#(#locals),*))
            }
        }
    };

    let invoke_variant = if is_async {
        quote!(::cmdfns::Invoke::Async(#invoke_fn))
    } else {
        quote!(::cmdfns::Invoke::Sync(#invoke_fn))
    };

    let param_defs = params.iter().map(|param| {
        let name = &param.name;
        let declared_type = &param.declared_type;
        let default = match &param.default {
            Some(token) => quote!(::core::option::Option::Some(#token)),
            None => quote!(::core::option::Option::None),
        };
        let optional = matches!(param.shape, Shape::Optional);
        let variadic = matches!(param.shape, Shape::Variadic);
        quote! {
            ::cmdfns::ParamDef {
                name: #name,
                declared_type: #declared_type,
                default: #default,
                optional: #optional,
                variadic: #variadic,
            }
        }
    });

    Ok(quote! {
        #input

        #invoke

        #[::cmdfns::__private::linkme::distributed_slice(::cmdfns::command::MARKED_COMMANDS)]
        #[linkme(crate = ::cmdfns::__private::linkme)]
        #[allow(non_upper_case_globals)]
        #[doc(hidden)]
        static #static_name: ::cmdfns::CommandDef = ::cmdfns::CommandDef {
            name: #command_name,
            doc: #doc,
            source_file: ::core::file!(),
            parameters: &[#(#param_defs),*],
            invoke: #invoke_variant,
        };
    })
}

/// Read every parameter and strip the `#[arg(...)]` attributes the compiler
/// would otherwise reject.
fn collect_params(input: &mut ItemFn) -> syn::Result<Vec<Param>> {
    let total = input.sig.inputs.len();
    let mut params = Vec::with_capacity(total);

    for (i, arg) in input.sig.inputs.iter_mut().enumerate() {
        let pat_type = match arg {
            FnArg::Typed(pat_type) => pat_type,
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new(
                    receiver.span(),
                    "#[command] cannot be applied to methods",
                ));
            }
        };

        let name = match &*pat_type.pat {
            Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => pat.ident.unraw().to_string(),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "command parameters must be plain identifiers",
                ));
            }
        };

        let mut default = None;
        let mut kept = Vec::with_capacity(pat_type.attrs.len());
        for attr in pat_type.attrs.drain(..) {
            if attr.path().is_ident("arg") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("default") {
                        default = Some(default_token(meta.value()?)?);
                        Ok(())
                    } else {
                        Err(meta.error("unknown `arg` option, expected `default`"))
                    }
                })?;
            } else {
                kept.push(attr);
            }
        }
        pat_type.attrs = kept;

        let ty = (*pat_type.ty).clone();
        let (shape, inner) = shape_of(&ty)?;

        if matches!(shape, Shape::Variadic) {
            if i + 1 != total {
                return Err(syn::Error::new(
                    ty.span(),
                    "a `Vec` parameter collects the remaining arguments and must come last",
                ));
            }
            if default.is_some() {
                return Err(syn::Error::new(
                    ty.span(),
                    "a `Vec` parameter cannot have a default",
                ));
            }
        }

        params.push(Param {
            name,
            declared_type: declared_type(inner),
            ty,
            shape,
            default,
        });
    }

    Ok(params)
}

/// `#[arg(default = ...)]` accepts string, integer, float and bool literals.
fn default_token(input: ParseStream) -> syn::Result<String> {
    let negative = input.parse::<Option<Token![-]>>()?.is_some();
    let lit: Lit = input.parse()?;
    let token = match &lit {
        Lit::Int(int) => int.base10_digits().to_string(),
        Lit::Float(float) => float.base10_digits().to_string(),
        Lit::Str(s) if !negative => return Ok(s.value()),
        Lit::Bool(b) if !negative => return Ok(if b.value { "True" } else { "False" }.to_string()),
        _ => return Err(syn::Error::new(lit.span(), "unsupported default value")),
    };
    Ok(if negative { format!("-{}", token) } else { token })
}

/// Split `Option<T>` / `Vec<T>` wrappers off a parameter type.
fn shape_of(ty: &Type) -> syn::Result<(Shape, &Type)> {
    match ty {
        Type::Reference(reference) => Err(syn::Error::new(
            reference.span(),
            "command parameters must be owned types; use `String` instead of `&str`",
        )),
        Type::Path(path) if path.qself.is_none() => {
            let Some(last) = path.path.segments.last() else {
                return Ok((Shape::Plain, ty));
            };
            let shape = if last.ident == "Option" {
                Shape::Optional
            } else if last.ident == "Vec" {
                Shape::Variadic
            } else {
                return Ok((Shape::Plain, ty));
            };
            match single_type_argument(&last.arguments) {
                Some(inner) => Ok((shape, inner)),
                None => Ok((Shape::Plain, ty)),
            }
        }
        _ => Ok((Shape::Plain, ty)),
    }
}

fn single_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(ty)) if args.args.len() == 1 => Some(ty),
        _ => None,
    }
}

fn declared_type(ty: &Type) -> TokenStream2 {
    let ident = match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    };

    match ident.as_deref() {
        Some("i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize") => {
            quote!(::cmdfns::DeclaredType::Int)
        }
        Some("f32" | "f64") => quote!(::cmdfns::DeclaredType::Float),
        Some("bool") => quote!(::cmdfns::DeclaredType::Bool),
        Some("Value") => quote!(::cmdfns::DeclaredType::None),
        _ => quote!(::cmdfns::DeclaredType::Other),
    }
}

/// Doc comments joined into one block, one leading space stripped per line.
fn doc_text(attrs: &[syn::Attribute]) -> String {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').unwrap_or(&line).trim_end().to_string())
        .collect();

    lines.join("\n").trim().to_string()
}
