//! Derive macro for quarry table declarations.
//!
//! `#[derive(Table)]` turns a struct with named fields into a
//! `quarry_core::TableSchema` implementation whose `table()` returns one
//! shared `quarry_core::Table` node.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr,
    PathArguments, Type,
};

/// Derives `quarry_core::TableSchema` for a struct.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - SQL table name (defaults to the
///   snake_case struct name)
/// - `#[table(schema = "schema")]` - schema qualifier
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - SQL column name (defaults to the
///   field name)
/// - `#[column(optional)]` - INSERT rows may omit the column
/// - `#[column(required)]` - INSERT rows must provide the column, even for
///   an `Option` field
/// - `#[column(sql_type = "json")]` - overrides the inferred type; one of
///   `boolean`, `integer`, `float`, `text`, `blob`, `json`, `timestamp`
/// - `#[column(skip)]` - the field is not a column
///
/// `Option<T>` fields are nullable and optional.
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_table_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_table_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_attrs = parse_table_attrs(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Table derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Table derive only supports structs",
            ));
        }
    };

    let mut columns: Vec<TokenStream2> = Vec::new();
    for field in fields {
        let attrs = parse_column_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let column_name = attrs.name.unwrap_or_else(|| field_name.to_string());

        let (inner, is_option) = match option_inner(&field.ty) {
            Some(inner) => (inner, true),
            None => (&field.ty, false),
        };
        let base = match attrs.sql_type {
            Some(kind) => kind,
            None => TypeKind::infer(inner).ok_or_else(|| {
                syn::Error::new_spanned(
                    &field.ty,
                    "cannot infer a SQL type for this field; use #[column(sql_type = \"...\")]",
                )
            })?,
        };
        let sql_type = base.tokens(is_option);

        let required = match (attrs.required, attrs.optional) {
            (true, true) => {
                return Err(syn::Error::new_spanned(
                    field,
                    "a column cannot be both required and optional",
                ));
            }
            (true, false) => true,
            (false, true) => false,
            (false, false) => !is_option,
        };

        columns.push(quote! {
            .column(::quarry_core::ColumnSpec::new(#column_name, #sql_type), #required)
        });
    }

    let table_name = &table_attrs.name;
    let schema_call = table_attrs
        .schema
        .as_ref()
        .map(|schema| quote! { .schema(#schema) });

    let expanded = quote! {
        impl ::quarry_core::TableSchema for #struct_name {
            fn table() -> ::quarry_core::Table {
                static TABLE: ::std::sync::OnceLock<::quarry_core::Table> =
                    ::std::sync::OnceLock::new();
                TABLE
                    .get_or_init(|| {
                        ::quarry_core::Table::builder(#table_name)
                            #schema_call
                            #(#columns)*
                            .build()
                    })
                    .clone()
            }
        }
    };

    Ok(expanded)
}

#[derive(Clone, Copy)]
enum TypeKind {
    Boolean,
    Integer,
    Float,
    Text,
    Blob,
    Json,
    Timestamp,
}

impl TypeKind {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "text" => Some(Self::Text),
            "blob" => Some(Self::Blob),
            "json" => Some(Self::Json),
            "timestamp" => Some(Self::Timestamp),
            _ => None,
        }
    }

    fn infer(ty: &Type) -> Option<Self> {
        let Type::Path(path) = ty else {
            return None;
        };
        let segment = path.path.segments.last()?;
        match segment.ident.to_string().as_str() {
            "bool" => Some(Self::Boolean),
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => Some(Self::Integer),
            "f32" | "f64" => Some(Self::Float),
            "String" => Some(Self::Text),
            "Value" => Some(Self::Json),
            "DateTime" => Some(Self::Timestamp),
            "Vec" if generic_arg(&segment.arguments).is_some_and(is_u8) => Some(Self::Blob),
            _ => None,
        }
    }

    fn tokens(self, nullable: bool) -> TokenStream2 {
        let variant = match self {
            Self::Boolean => quote!(Boolean),
            Self::Integer => quote!(Integer),
            Self::Float => quote!(Float),
            Self::Text => quote!(Text),
            Self::Blob => quote!(Blob),
            Self::Json => quote!(Json),
            Self::Timestamp => quote!(Timestamp),
        };
        if nullable {
            quote! { ::quarry_core::SqlType::#variant.nullable() }
        } else {
            quote! { ::quarry_core::SqlType::#variant }
        }
    }
}

fn generic_arg(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn is_u8(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.path.is_ident("u8"))
}

/// Returns `T` for a field of type `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    generic_arg(&segment.arguments)
}

struct TableAttrs {
    name: String,
    schema: Option<String>,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    optional: bool,
    required: bool,
    sql_type: Option<TypeKind>,
    skip: bool,
}

fn parse_table_attrs(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<TableAttrs> {
    let mut result = TableAttrs {
        name: to_snake_case(&struct_name.to_string()),
        schema: None,
    };
    for attr in attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = value.value();
                } else if meta.path.is_ident("schema") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.schema = Some(value.value());
                } else {
                    return Err(meta.error("unsupported table attribute"));
                }
                Ok(())
            })?;
        }
    }
    Ok(result)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("optional") {
                    result.optional = true;
                } else if meta.path.is_ident("required") {
                    result.required = true;
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("sql_type") {
                    let value: LitStr = meta.value()?.parse()?;
                    let kind = TypeKind::parse(&value.value())
                        .ok_or_else(|| syn::Error::new_spanned(&value, "unknown sql_type"))?;
                    result.sql_type = Some(kind);
                } else {
                    return Err(meta.error("unsupported column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
