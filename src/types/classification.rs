//! Classification result types
//!
//! Six canonical output fields per ticket. `SCOPE_REFINAMIENTO` is not
//! stored: it is always read back from `SCOPE`.

/// Canonical field names, in output order
pub const OUTPUT_FIELDS: [&str; 6] = [
    "ANTIGUEDAD",
    "TIPO_DE_PRODUCTO",
    "SCOPE",
    "COMPLEJIDAD",
    "SCOPE_REFINAMIENTO",
    "JUSTIFICACION",
];

/// Canonical `ANTIGUEDAD` values
pub mod antiguedad {
    pub const NUEVO: &str = "Nuevo";
    pub const CARRY_OVER: &str = "Carry Over";
    pub const NOT_APPLICABLE: &str = "N/A";
    pub const ERROR: &str = "ERROR";
}

/// Canonical `TIPO_DE_PRODUCTO` values
pub mod tipo_de_producto {
    pub const NUEVA_CONEXION: &str = "Nueva Conexion";
    pub const NUEVO_PRODUCTO: &str = "Nuevo Producto";
    pub const MEJORA: &str = "Mejora o modificacion de conexion existente";
}

/// Canonical `SCOPE` values
pub mod scope {
    pub const SOPORTE: &str = "Soporte";
    pub const ANALISIS: &str = "Analisis";
    pub const DESARROLLO: &str = "Desarrollo";
    pub const ANALISIS_Y_DESARROLLO: &str = "Analisis y Desarrollo";
}

/// Canonical `COMPLEJIDAD` values
pub mod complejidad {
    pub const MULTI_FLUJO: &str = "Poroto abarca mas de un flujo";
    pub const UN_FLUJO: &str = "Poroto abarca solo un flujo";
}

/// Normalized classification of one ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    antiguedad: String,
    tipo_de_producto: String,
    scope: String,
    complejidad: String,
    justificacion: String,
}

impl ClassificationResult {
    /// Result for tickets outside the product/scope taxonomy
    /// (Carry Over, N/A): dependent fields stay empty
    pub(crate) fn without_scope(antiguedad: impl Into<String>, justificacion: impl Into<String>) -> Self {
        Self {
            antiguedad: antiguedad.into(),
            tipo_de_producto: String::new(),
            scope: String::new(),
            complejidad: String::new(),
            justificacion: justificacion.into(),
        }
    }

    pub(crate) fn with_scope(
        antiguedad: impl Into<String>,
        tipo_de_producto: impl Into<String>,
        scope: impl Into<String>,
        complejidad: impl Into<String>,
        justificacion: impl Into<String>,
    ) -> Self {
        Self {
            antiguedad: antiguedad.into(),
            tipo_de_producto: tipo_de_producto.into(),
            scope: scope.into(),
            complejidad: complejidad.into(),
            justificacion: justificacion.into(),
        }
    }

    /// ERROR row: everything but the justification is empty
    pub fn error(justificacion: impl Into<String>) -> Self {
        Self::without_scope(antiguedad::ERROR, justificacion)
    }

    pub fn antiguedad(&self) -> &str {
        &self.antiguedad
    }

    pub fn tipo_de_producto(&self) -> &str {
        &self.tipo_de_producto
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn complejidad(&self) -> &str {
        &self.complejidad
    }

    pub fn scope_refinamiento(&self) -> &str {
        &self.scope
    }

    pub fn justificacion(&self) -> &str {
        &self.justificacion
    }

    pub fn is_error(&self) -> bool {
        self.antiguedad == antiguedad::ERROR
    }

    /// Field values in `OUTPUT_FIELDS` order
    pub fn fields(&self) -> [&str; 6] {
        [
            self.antiguedad(),
            self.tipo_de_producto(),
            self.scope(),
            self.complejidad(),
            self.scope_refinamiento(),
            self.justificacion(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_row_is_empty() {
        let result = ClassificationResult::error("Error: boom");
        assert!(result.is_error());
        assert_eq!(result.scope(), "");
        assert_eq!(result.scope_refinamiento(), "");
        assert_eq!(result.justificacion(), "Error: boom");
    }

    #[test]
    fn test_fields_order_mirrors_scope() {
        let result = ClassificationResult::with_scope(
            antiguedad::NUEVO,
            tipo_de_producto::MEJORA,
            scope::SOPORTE,
            complejidad::UN_FLUJO,
            "ok",
        );
        let fields = result.fields();
        assert_eq!(fields[2], scope::SOPORTE);
        assert_eq!(fields[4], scope::SOPORTE);
        assert_eq!(fields.len(), OUTPUT_FIELDS.len());
    }
}
