use serde::{Deserialize, Serialize};

/// A row of the product catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub nombre: String,
    pub categoria: String,
    pub codigo_producto: String,
    pub descripcion_corta: Option<String>,
    pub presentacion: Option<String>,
    pub para_que_sirve: Option<String>,
    pub beneficios_principales: Option<String>,
    pub dosis_recomendada: Option<String>,
    pub precio: f64,
    pub sintomas_que_trata: Option<String>,
    pub activo: bool,
}

/// Validated product fields, ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub nombre: String,
    pub categoria: String,
    pub codigo_producto: String,
    pub descripcion_corta: Option<String>,
    pub presentacion: Option<String>,
    pub para_que_sirve: Option<String>,
    pub beneficios_principales: Option<String>,
    pub dosis_recomendada: Option<String>,
    pub precio: f64,
    pub sintomas_que_trata: Option<String>,
    pub activo: bool,
}

impl ProductDraft {
    pub fn into_product(self, id: u64) -> Product {
        Product {
            id,
            nombre: self.nombre,
            categoria: self.categoria,
            codigo_producto: self.codigo_producto,
            descripcion_corta: self.descripcion_corta,
            presentacion: self.presentacion,
            para_que_sirve: self.para_que_sirve,
            beneficios_principales: self.beneficios_principales,
            dosis_recomendada: self.dosis_recomendada,
            precio: self.precio,
            sintomas_que_trata: self.sintomas_que_trata,
            activo: self.activo,
        }
    }
}

/// Raw admin form input. Every text field arrives untrimmed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub nombre: String,
    pub categoria: String,
    pub codigo_producto: String,
    pub descripcion_corta: String,
    pub presentacion: String,
    pub para_que_sirve: String,
    pub beneficios: String,
    pub dosis: String,
    pub precio: String,
    pub sintomas_que_trata: String,
    pub activo: bool,
}

impl From<&Product> for ProductForm {
    fn from(p: &Product) -> Self {
        Self {
            nombre: p.nombre.clone(),
            categoria: p.categoria.clone(),
            codigo_producto: p.codigo_producto.clone(),
            descripcion_corta: p.descripcion_corta.clone().unwrap_or_default(),
            presentacion: p.presentacion.clone().unwrap_or_default(),
            para_que_sirve: p.para_que_sirve.clone().unwrap_or_default(),
            beneficios: p.beneficios_principales.clone().unwrap_or_default(),
            dosis: p.dosis_recomendada.clone().unwrap_or_default(),
            precio: p.precio.to_string(),
            sintomas_que_trata: p.sintomas_que_trata.clone().unwrap_or_default(),
            activo: p.activo,
        }
    }
}

/// Categories offered by the admin form
pub const CATEGORIES: &[(&str, &str)] = &[
    ("moringa_capsulas", "Moringa Cápsulas"),
    ("moringa_aceite", "Moringa Aceite"),
    ("moringa_polvo", "Moringa Polvo"),
    ("ganoderma_te", "Ganoderma Té"),
    ("ganoderma_capsulas", "Ganoderma Cápsulas"),
    ("combos", "Combos"),
    ("otros", "Otros"),
];
