//! Classification normalizer
//!
//! Maps whatever the model answered onto the canonical taxonomy. Lookups
//! are case-insensitive on trimmed values; anything the synonym tables do
//! not know is kept as the model wrote it.

use serde_json::{Map, Value};

use crate::types::classification::{antiguedad, complejidad, scope, tipo_de_producto};
use crate::types::ClassificationResult;

const ANTIGUEDAD_SYNONYMS: &[(&str, &str)] = &[
    ("nuevo", antiguedad::NUEVO),
    ("carry over", antiguedad::CARRY_OVER),
    ("carryover", antiguedad::CARRY_OVER),
    ("n/a", antiguedad::NOT_APPLICABLE),
    ("na", antiguedad::NOT_APPLICABLE),
];

const TIPO_DE_PRODUCTO_SYNONYMS: &[(&str, &str)] = &[
    ("mejora", tipo_de_producto::MEJORA),
    ("mejora existente", tipo_de_producto::MEJORA),
    ("mejora o modificacion", tipo_de_producto::MEJORA),
    ("mejora o modificación de conexión existente", tipo_de_producto::MEJORA),
    ("nueva conexion", tipo_de_producto::NUEVA_CONEXION),
    ("nueva conexión", tipo_de_producto::NUEVA_CONEXION),
    ("nuevo producto", tipo_de_producto::NUEVO_PRODUCTO),
];

const SCOPE_SYNONYMS: &[(&str, &str)] = &[
    ("analisis", scope::ANALISIS),
    ("análisis", scope::ANALISIS),
    ("desarrollo", scope::DESARROLLO),
    ("soporte", scope::SOPORTE),
    ("analisis y desarrollo", scope::ANALISIS_Y_DESARROLLO),
    ("análisis y desarrollo", scope::ANALISIS_Y_DESARROLLO),
    ("a&d", scope::ANALISIS_Y_DESARROLLO),
];

/// Model reply fields before normalization; absent keys are empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawClassification {
    pub antiguedad: String,
    pub tipo_de_producto: String,
    pub scope: String,
    pub complejidad: String,
    pub justificacion: String,
}

impl RawClassification {
    /// Read the fields out of a validated reply
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let field = |name: &str| object.get(name).map(value_as_text).unwrap_or_default();

        Self {
            antiguedad: field("ANTIGUEDAD"),
            tipo_de_producto: field("TIPO_DE_PRODUCTO"),
            scope: field("SCOPE"),
            complejidad: field("COMPLEJIDAD"),
            justificacion: field("JUSTIFICACION"),
        }
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Canonical value for `raw`, or `raw` itself when unknown
fn lookup(table: &[(&str, &'static str)], raw: &str) -> String {
    let needle = raw.trim().to_lowercase();
    table
        .iter()
        .find(|(synonym, _)| *synonym == needle)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Produce a result where:
/// - Carry Over and N/A carry no product, scope or complexity
/// - every other value has all three filled, defaults where missing
/// - `SCOPE_REFINAMIENTO` reads back `SCOPE`
pub fn normalize(raw: RawClassification) -> ClassificationResult {
    let antiguedad_value = lookup(ANTIGUEDAD_SYNONYMS, &raw.antiguedad);

    if antiguedad_value == antiguedad::CARRY_OVER || antiguedad_value == antiguedad::NOT_APPLICABLE {
        return ClassificationResult::without_scope(antiguedad_value, raw.justificacion);
    }

    let tipo = or_default(
        lookup(TIPO_DE_PRODUCTO_SYNONYMS, &raw.tipo_de_producto),
        tipo_de_producto::MEJORA,
    );
    let scope_value = or_default(lookup(SCOPE_SYNONYMS, &raw.scope), scope::DESARROLLO);
    let complejidad_value = or_default(raw.complejidad, complejidad::UN_FLUJO);

    ClassificationResult::with_scope(
        antiguedad_value,
        tipo,
        scope_value,
        complejidad_value,
        raw.justificacion,
    )
}
