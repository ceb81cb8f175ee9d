//! Product catalog administration.
//!
//! Validation, automatic product codes, spreadsheet export/import. The store
//! behind `CatalogPort` owns code uniqueness; this service pre-checks where a
//! friendlier message is possible and maps the store's typed errors.

use std::rc::Rc;

use chrono::NaiveDate;
use kairos_types::{
    CatalogError,
    config::LIMA_UTC_OFFSET_MINUTES,
    product::{Product, ProductDraft, ProductForm},
};
use uuid::Uuid;

use crate::ports::{CatalogPort, CatalogResult, ClockPort};

pub const ERR_NAME_REQUIRED: &str = "El nombre es obligatorio";
pub const ERR_CATEGORY_REQUIRED: &str = "La categoría es obligatoria";
pub const ERR_PRICE: &str = "El precio es obligatorio y debe ser numérico";
pub const ERR_DUPLICATE_STORED: &str = "El código de producto ya existe en la base de datos.";
pub const ERR_INVALID_ID: &str = "ID inválido";
pub const ERR_NOT_FOUND: &str = "Producto no encontrado";
pub const ERR_STORE: &str = "Error al guardar el producto";

/// Attempts at a fresh generated code before giving up
const CODE_ATTEMPTS: usize = 3;

const DEFAULT_CATEGORY: &str = "otros";

/// Code prefix for categories that do not yield three letters
const FALLBACK_PREFIX: &str = "OTR";

/// Column layout shared by export and import
pub const EXPORT_HEADERS: [&str; 12] = [
    "ID",
    "Nombre",
    "Categoría",
    "Código",
    "Descripción Corta",
    "Presentación",
    "Para qué sirve",
    "Beneficios",
    "Dosis",
    "Precio",
    "Síntomas",
    "Activo",
];

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    /// One entry per failed row, prefixed with its sheet row number
    pub errors: Vec<String>,
}

pub struct CatalogService {
    store: Rc<dyn CatalogPort>,
    clock: Rc<dyn ClockPort>,
    utc_offset_minutes: i32,
}

impl CatalogService {
    pub fn new(store: Rc<dyn CatalogPort>, clock: Rc<dyn ClockPort>) -> Self {
        Self {
            store,
            clock,
            utc_offset_minutes: LIMA_UTC_OFFSET_MINUTES,
        }
    }

    /// Date generated codes on a different wall clock than Lima's.
    pub fn with_utc_offset(mut self, utc_offset_minutes: i32) -> Self {
        self.utc_offset_minutes = utc_offset_minutes;
        self
    }

    /// All products, by name.
    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        let mut products = self.store.list().await?;
        products.sort_by_key(|p| p.nombre.to_lowercase());
        Ok(products)
    }

    pub async fn count_active(&self) -> CatalogResult<usize> {
        Ok(self.store.list().await?.iter().filter(|p| p.activo).count())
    }

    pub async fn get_product(&self, id: u64) -> CatalogResult<Product> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound(id))
    }

    /// Create a product. An empty code is generated from category and date.
    pub async fn create_product(&self, form: &ProductForm) -> CatalogResult<Product> {
        let draft = validate_form(form, true)?;

        if !draft.codigo_producto.is_empty() {
            if self.store.find_by_code(&draft.codigo_producto).await?.is_some() {
                return Err(CatalogError::DuplicateCode(draft.codigo_producto));
            }
            let product = self.store.insert(draft).await?;
            log::info!("Product {} created with code {}", product.id, product.codigo_producto);
            return Ok(product);
        }

        let product = self.insert_with_generated_code(draft).await?;
        log::info!("Product {} created with generated code {}", product.id, product.codigo_producto);
        Ok(product)
    }

    /// Update a product. Empty code or category keep the stored values.
    pub async fn update_product(&self, id: u64, form: &ProductForm) -> CatalogResult<Product> {
        if id == 0 {
            return Err(CatalogError::Invalid(vec![ERR_INVALID_ID.to_string()]));
        }
        let mut draft = validate_form(form, false)?;
        let existing = self.get_product(id).await?;

        if draft.codigo_producto.is_empty() {
            draft.codigo_producto = existing.codigo_producto.clone();
        }
        if draft.categoria.is_empty() {
            draft.categoria = existing.categoria.clone();
        }

        if draft.codigo_producto != existing.codigo_producto {
            if let Some(owner) = self.store.find_by_code(&draft.codigo_producto).await? {
                if owner.id != id {
                    return Err(CatalogError::DuplicateCode(draft.codigo_producto));
                }
            }
        }

        let product = self.store.update(id, draft).await?;
        log::info!("Product {} updated", id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: u64) -> CatalogResult<()> {
        if id == 0 {
            return Err(CatalogError::Invalid(vec![ERR_INVALID_ID.to_string()]));
        }
        self.get_product(id).await?;
        self.store.delete(id).await?;
        log::info!("Product {} deleted", id);
        Ok(())
    }

    // ─── Export / import ─────────────────────────────────────

    /// Every product as a sheet row in `EXPORT_HEADERS` order, by name.
    pub async fn export_rows(&self) -> CatalogResult<Vec<Vec<String>>> {
        Ok(self.list_products().await?.iter().map(product_row).collect())
    }

    /// Upsert sheet rows (header excluded).
    ///
    /// A row whose numeric ID exists updates that product; anything else is
    /// inserted. Rows without a name are skipped. A failing row is reported
    /// and the batch continues.
    pub async fn import_rows(&self, rows: &[Vec<String>]) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for (i, row) in rows.iter().enumerate() {
            // sheet numbering: header is row 1
            let line = i + 2;
            let cell = |idx: usize| row.get(idx).map(|c| c.trim()).unwrap_or("");

            if cell(1).is_empty() {
                summary.skipped += 1;
                continue;
            }

            let precio = match parse_price(cell(9)) {
                Some(p) => p,
                None if cell(9).is_empty() => 0.0,
                None => {
                    summary.errors.push(format!("Fila {}: {}", line, ERR_PRICE));
                    continue;
                }
            };

            let categoria = match cell(2) {
                "" => DEFAULT_CATEGORY,
                c => c,
            };
            let activo = match cell(11) {
                "" => true,
                v => matches!(v.to_lowercase().as_str(), "sí" | "si" | "1" | "true"),
            };

            let mut draft = ProductDraft {
                nombre: cell(1).to_string(),
                categoria: categoria.to_string(),
                codigo_producto: cell(3).to_string(),
                descripcion_corta: optional(cell(4)),
                presentacion: optional(cell(5)),
                para_que_sirve: optional(cell(6)),
                beneficios_principales: optional(cell(7)),
                dosis_recomendada: optional(cell(8)),
                precio,
                sintomas_que_trata: optional(cell(10)),
                activo,
            };

            let existing = match cell(0).parse::<u64>().ok().filter(|id| *id > 0) {
                Some(id) => match self.store.get(id).await {
                    Ok(found) => found,
                    Err(e) => {
                        summary.errors.push(row_error(line, &e));
                        continue;
                    }
                },
                None => None,
            };

            let outcome = match existing {
                Some(current) => {
                    if draft.codigo_producto.is_empty() {
                        draft.codigo_producto = current.codigo_producto.clone();
                    }
                    self.store.update(current.id, draft).await.map(|_| true)
                }
                None if draft.codigo_producto.is_empty() => {
                    self.insert_with_generated_code(draft).await.map(|_| false)
                }
                None => self.store.insert(draft).await.map(|_| false),
            };

            match outcome {
                Ok(true) => summary.updated += 1,
                Ok(false) => summary.imported += 1,
                Err(e) => summary.errors.push(row_error(line, &e)),
            }
        }

        log::info!(
            "Import finished: {} imported, {} updated, {} skipped, {} errors",
            summary.imported,
            summary.updated,
            summary.skipped,
            summary.errors.len()
        );
        summary
    }

    // ─── Internals ───────────────────────────────────────────

    fn today(&self) -> NaiveDate {
        self.clock.local_date(self.utc_offset_minutes)
    }

    async fn insert_with_generated_code(&self, mut draft: ProductDraft) -> CatalogResult<Product> {
        let today = self.today();
        for attempt in 1..=CODE_ATTEMPTS {
            draft.codigo_producto = generate_code(&draft.categoria, today, random_suffix());
            match self.store.insert(draft.clone()).await {
                Err(CatalogError::DuplicateCode(code)) => {
                    log::warn!("Generated code {} already taken (attempt {})", code, attempt);
                }
                other => return other,
            }
        }
        // empty code: nothing the admin typed collided
        Err(CatalogError::DuplicateCode(String::new()))
    }
}

/// `<CAT>-<YYMMDD>-<suffix>`, with the category's first three letters uppercased.
/// Categories that do not start with three ASCII letters get `OTR`.
pub fn generate_code(categoria: &str, date: NaiveDate, suffix: u16) -> String {
    let head: Vec<char> = categoria.trim().chars().take(3).collect();
    let prefix = if head.len() == 3 && head.iter().all(char::is_ascii_alphabetic) {
        head.iter().collect::<String>().to_ascii_uppercase()
    } else {
        FALLBACK_PREFIX.to_string()
    };
    format!("{}-{}-{}", prefix, date.format("%y%m%d"), suffix)
}

/// Three-digit suffix in `100..=999`
fn random_suffix() -> u16 {
    (100 + Uuid::new_v4().as_u128() % 900) as u16
}

/// Messages to show the admin for a failed catalog operation.
pub fn friendly_messages(err: &CatalogError) -> Vec<String> {
    match err {
        CatalogError::DuplicateCode(code) if code.is_empty() => vec![ERR_DUPLICATE_STORED.to_string()],
        CatalogError::DuplicateCode(code) => vec![format!(
            "El código \"{}\" ya existe. Usa otro código o déjalo vacío para generar uno automático.",
            code
        )],
        CatalogError::NotFound(_) => vec![ERR_NOT_FOUND.to_string()],
        CatalogError::Invalid(messages) => messages.clone(),
        CatalogError::Store(detail) => {
            log::error!("Catalog store error: {}", detail);
            vec![ERR_STORE.to_string()]
        }
    }
}

/// Trim and check an admin form.
///
/// `require_category` is set on create; on update an empty category keeps
/// the stored one.
pub fn validate_form(form: &ProductForm, require_category: bool) -> CatalogResult<ProductDraft> {
    let mut errors = Vec::new();

    let nombre = form.nombre.trim();
    if nombre.is_empty() {
        errors.push(ERR_NAME_REQUIRED.to_string());
    }
    let categoria = form.categoria.trim();
    if require_category && categoria.is_empty() {
        errors.push(ERR_CATEGORY_REQUIRED.to_string());
    }
    let precio = parse_price(&form.precio);
    if precio.is_none() {
        errors.push(ERR_PRICE.to_string());
    }

    match precio {
        Some(precio) if errors.is_empty() => Ok(ProductDraft {
            nombre: nombre.to_string(),
            categoria: categoria.to_string(),
            codigo_producto: form.codigo_producto.trim().to_string(),
            descripcion_corta: optional(&form.descripcion_corta),
            presentacion: optional(&form.presentacion),
            para_que_sirve: optional(&form.para_que_sirve),
            beneficios_principales: optional(&form.beneficios),
            dosis_recomendada: optional(&form.dosis),
            precio,
            sintomas_que_trata: optional(&form.sintomas_que_trata),
            activo: form.activo,
        }),
        _ => Err(CatalogError::Invalid(errors)),
    }
}

/// Accepts `12.50` and `12,50`.
pub fn parse_price(input: &str) -> Option<f64> {
    let normalized = input.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|p| p.is_finite())
}

pub fn product_row(p: &Product) -> Vec<String> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        p.id.to_string(),
        p.nombre.clone(),
        p.categoria.clone(),
        p.codigo_producto.clone(),
        opt(&p.descripcion_corta),
        opt(&p.presentacion),
        opt(&p.para_que_sirve),
        opt(&p.beneficios_principales),
        opt(&p.dosis_recomendada),
        format!("{:.2}", p.precio),
        opt(&p.sintomas_que_trata),
        if p.activo { "Sí" } else { "No" }.to_string(),
    ]
}

// ─── Tab-separated sheets ────────────────────────────────────

/// Header plus rows as tab-separated text, the format spreadsheets paste.
pub fn to_tsv(rows: &[Vec<String>]) -> String {
    let clean = |c: &str| c.replace(['\t', '\r', '\n'], " ");
    let mut out = EXPORT_HEADERS.join("\t");
    for row in rows {
        out.push('\n');
        out.push_str(&row.iter().map(|c| clean(c)).collect::<Vec<_>>().join("\t"));
    }
    out
}

/// Split pasted sheet text into rows, dropping a leading header row and
/// blank lines.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.split('\t').map(|c| c.trim().to_string()).collect())
        .collect();
    let has_header = rows
        .first()
        .map(|r| r.len() > 1 && r[0] == EXPORT_HEADERS[0] && r[1] == EXPORT_HEADERS[1])
        .unwrap_or(false);
    if has_header {
        rows.remove(0);
    }
    rows
}

fn optional(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn row_error(line: usize, err: &CatalogError) -> String {
    format!("Fila {}: {}", line, friendly_messages(err).join("; "))
}
