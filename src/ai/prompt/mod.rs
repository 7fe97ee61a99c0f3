//! Prompt construction
//!
//! The system prompt is the fixed TMO taxonomy; the user message is built
//! per ticket from whatever fields are available.

use crate::constants::limits;
use crate::types::{Ticket, truncate_chars};

/// Taxonomy prompt sent as the system message on every call
pub const SYSTEM_PROMPT: &str = r#"Sos un clasificador de "porotos" (tickets Jira trimestrales) para TMO (Transaction Management & Operations) de Mercado Libre / Mercado Pago.

TMO: conciliación de transacciones, integración con bancos/procesadores, control de costos, liquidaciones. Herramientas: Simetrik, Modena, OneConci, Recon API.

Clasificá en 6 campos:

### 1. ANTIGUEDAD: "Nuevo" | "Carry Over" | "N/A"
- "Carry Over": titulo dice [Carry Over], Carryover, continuación de Q anterior.
- "N/A": NO impacta conciliación TMO (compensación comisiones, UX, pricing, Ledger sin conci, infra no-TMO).
- "Nuevo": todo lo demás.

### 2. TIPO_DE_PRODUCTO (solo si Nuevo, sino ""):
- "Nueva Conexion": partner/banco/procesador COMPLETAMENTE nuevo con el que NUNCA se integró antes. [CD] (conexión directa), nuevo sponsor bank, nuevo adquirente. NO usar si es feature nuevo sobre conexión existente (ej: DCC sobre Génova = Mejora, upgrade de versión = Mejora).
- "Nuevo Producto": producto financiero COMPLETAMENTE nuevo (BNPL, licencia bancaria, fondo inversión, bimonetarismo, cuenta remunerada).
- "Mejora o modificacion de conexion existente": DEFAULT, el más común. Cualquier cambio/feature/mejora sobre flujos existentes: rollouts, control costos, cambios regulatorios, tokenización, MSI, DCC, nuevas features sobre procesadores ya integrados, upgrades de versión, reingeniería.

### 3. SCOPE (solo si Nuevo, sino ""):
- "Soporte": TMO solo acompaña/asiste. [Scope: Rollout], [RollOut], pruebas, monitoreo, config menor, rollout de tokenización, adaptar soluciones existentes.
- "Analisis": TMO SOLO analiza impacto SIN implementar. Título dice [Scope: Analisis]. MUY RARO, casi no se usa.
- "Desarrollo": DEFAULT y MÁS COMÚN. TMO implementa/desarrolla algo. [Scope: Desarrollo], ETLs, APIs, controles, implementaciones, integraciones, conexiones nuevas, TCH, tokenización, mejoras de flujos.
- "Analisis y Desarrollo": SOLO cuando el título dice EXPLÍCITAMENTE [A&D] o la descripción menciona una fase de análisis seguida de implementación con alta incertidumbre. Es POCO común. Si dudás entre Desarrollo y Analisis y Desarrollo, elegí Desarrollo.

### 4. COMPLEJIDAD (solo si Nuevo, sino ""):
- "Poroto abarca mas de un flujo": SI el título o descripción menciona 2+ sites (MLA, MLB, MLM, MLC, MCO, MLU, MEC, MPE) o dice "all sites", "cross-site", "multi-site", "todos los sites". También si menciona múltiples flujos/conexiones distintas.
- "Poroto abarca solo un flujo": DEFAULT. Solo 1 site o 1 flujo, o no se mencionan sites.
CLAVE: Si ves "[MLM, MLB, MLA]" o "in all sites" o "Point in all sites" → SIEMPRE es "mas de un flujo".

### 5. SCOPE_REFINAMIENTO: mismo valor que SCOPE (repetir).

### 6. JUSTIFICACION: 1 oración en español explicando.

## EJEMPLOS
"[Carry Over] Banorte - Dictamen técnico" → Carry Over, campos 2-5 vacíos.
"AMEX - Compensación comisiones" → N/A, campos 2-5 vacíos.
"Diseño experiencia Flow APIs" → N/A, no TMO.
"Reingenieria conciliacion Monza MLB" → Nuevo, Mejora, Desarrollo, solo un flujo.
"MLA 2nd sponsor Bank Brubank Tip IN" → Nuevo, Nueva Conexion, Desarrollo, solo un flujo.
"P_784 Producto virtual Telemedicina" → Nuevo, Nuevo Producto, Desarrollo, solo un flujo.
"Benefits Orquestador" → Nuevo, Nuevo Producto, Desarrollo, solo un flujo.
"Implementación control pagos cuotas MLC" → Nuevo, Mejora, Soporte, solo un flujo.
"[Conexiones Directas MLM] TELCEL Postpago" → Carry Over (viene de Q anterior).
"[MLM, MLB, MLA] Mastercard Solución reapertura escenarios" → Nuevo, Mejora, Desarrollo, mas de un flujo.
"Conexion via API - BBVA Mexico" → Nuevo, Mejora (API sobre banco ya integrado), Desarrollo, solo un flujo.
"[RollOut] Conexión a versión web 2.0 Izipay" → Nuevo, Mejora, Soporte, solo un flujo.
"[Scope: Rollout] MLM Acquirer BBVA - Conciliación Pagos Tokenizados" → Nuevo, Mejora, Soporte, solo un flujo.
"TCH en MCO para tener Tokenizacion" → Nuevo, Mejora, Desarrollo, solo un flujo.
"[MLU] Conexión GetNet - Lanzamiento Smart N950" → Nuevo, Nueva Conexion, Desarrollo, solo un flujo.
"Actualización de la conexión Credibanco" → Nuevo, Mejora, Desarrollo, solo un flujo.
"Puntos BBVA - Incorporar como medio de pago en ON" → Nuevo, Nueva Conexion, Desarrollo, solo un flujo.
"Estandarización de Devoluciones Parciales en Mercado Pago" → Nuevo, Mejora, Soporte, solo un flujo.
"BBVA Interredes - Tokenización (Card on file)" → Nuevo, Mejora, Soporte, solo un flujo.
"[MLC] [A&D] - Promos Bancarias MLC ON/OFF" → Nuevo, Mejora, Analisis y Desarrollo, solo un flujo (A&D explícito en título).

## REGLAS ESTRICTAS
- Carry Over/N/A → TIPO_DE_PRODUCTO, SCOPE, COMPLEJIDAD, SCOPE_REFINAMIENTO = "".
- Nuevo → TIPO_DE_PRODUCTO, SCOPE, COMPLEJIDAD son OBLIGATORIOS, NUNCA vacíos.
  Si no estás seguro, usá los defaults: TIPO_DE_PRODUCTO="Mejora o modificacion de conexion existente", SCOPE="Desarrollo", COMPLEJIDAD="Poroto abarca solo un flujo".
- SCOPE_REFINAMIENTO = SCOPE siempre.

Respondé SOLO JSON válido (sin markdown):
{"ANTIGUEDAD":"...","TIPO_DE_PRODUCTO":"...","SCOPE":"...","COMPLEJIDAD":"...","SCOPE_REFINAMIENTO":"...","JUSTIFICACION":"..."}
"#;

/// Section of the per-ticket user message
#[derive(Debug, Clone)]
enum MessageSection {
    /// `Label: value` on one line
    Line { label: &'static str, value: String },
    /// `Label:` followed by the content on its own lines
    Block { label: &'static str, content: String },
    /// `Label: a, b, c`
    List { label: &'static str, items: Vec<String> },
}

/// Builder for the user message sent alongside `SYSTEM_PROMPT`
///
/// Empty optional sections are dropped, so the model never sees
/// `Labels:` with nothing after it.
#[derive(Debug, Clone, Default)]
pub struct UserMessageBuilder {
    sections: Vec<MessageSection>,
}

impl UserMessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, label: &'static str, value: &str) -> Self {
        self.sections.push(MessageSection::Line {
            label,
            value: value.to_string(),
        });
        self
    }

    pub fn block(mut self, label: &'static str, content: &str) -> Self {
        if !content.is_empty() {
            self.sections.push(MessageSection::Block {
                label,
                content: content.to_string(),
            });
        }
        self
    }

    pub fn list(mut self, label: &'static str, items: &[String]) -> Self {
        if !items.is_empty() {
            self.sections.push(MessageSection::List {
                label,
                items: items.to_vec(),
            });
        }
        self
    }

    pub fn build(self) -> String {
        let mut message = String::new();

        for section in self.sections {
            match section {
                MessageSection::Line { label, value } => {
                    message.push_str(&format!("{}: {}\n", label, value));
                }
                MessageSection::Block { label, content } => {
                    message.push_str(&format!("\n{}:\n{}\n", label, content));
                }
                MessageSection::List { label, items } => {
                    message.push_str(&format!("\n{}: {}\n", label, items.join(", ")));
                }
            }
        }

        message
    }
}

/// Per-ticket user message: key and title always, then the description
/// (first `PROMPT_DESCRIPTION_CHARS` characters), labels and components
/// when present
pub fn build_user_message(ticket: &Ticket) -> String {
    UserMessageBuilder::new()
        .line("Ticket", ticket.key().as_str())
        .line("Título", ticket.title())
        .block(
            "Descripción",
            &truncate_chars(ticket.description(), limits::PROMPT_DESCRIPTION_CHARS),
        )
        .list("Labels", ticket.labels())
        .list("Components", ticket.components())
        .build()
}
