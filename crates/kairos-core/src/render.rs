//! Renders a diagnosis payload into the chat message shown to the patient.

use kairos_types::diagnosis::DiagnosisResult;

const DEFAULT_IMPROVEMENT_TIME: &str = "2-3 semanas";

/// Multi-section text: diagnosis and confidence, causes, products with
/// dosing, plants, home remedies, diet and habit advice, expected timeframe.
/// Empty sections are omitted.
pub fn render_diagnosis(d: &DiagnosisResult) -> String {
    let mut sections: Vec<String> = Vec::new();

    let condition = d.diagnostico.as_deref().unwrap_or("Sin diagnóstico concluyente");
    let mut header = format!("🩺 Diagnóstico: {}", condition);
    if let Some(pct) = d.confidence_percent() {
        header.push_str(&format!(" (confianza {}%)", pct));
    }
    sections.push(header);

    if !d.causas.is_empty() {
        let mut s = String::from("🔍 Posibles causas:");
        push_bullets(&mut s, d.causas.iter().map(String::as_str));
        if let Some(expl) = non_empty(&d.explicacion_causas) {
            s.push('\n');
            s.push_str(expl);
        }
        sections.push(s);
    }

    if !d.productos.is_empty() {
        let mut s = String::from("💊 Productos recomendados:");
        for p in &d.productos {
            let mut line = p.nombre.clone();
            if let Some(dosis) = non_empty(&p.dosis) {
                line.push_str(&format!(": {}", dosis));
            }
            if let Some(cuando) = non_empty(&p.cuando_tomar) {
                line.push_str(&format!(" ({})", cuando));
            }
            if let Some(duracion) = non_empty(&p.duracion) {
                line.push_str(&format!(", durante {}", duracion));
            }
            push_bullets(&mut s, std::iter::once(line.as_str()));
        }
        sections.push(s);
    }

    if !d.plantas.is_empty() {
        let mut s = String::from("🌿 Plantas medicinales:");
        for p in &d.plantas {
            let mut line = p.nombre_comun.clone();
            if let Some(forma) = non_empty(&p.forma_uso) {
                line.push_str(&format!(" en {}", forma.to_lowercase()));
            }
            if let Some(dosis) = non_empty(&p.dosis) {
                line.push_str(&format!(": {}", dosis));
            }
            push_bullets(&mut s, std::iter::once(line.as_str()));
        }
        sections.push(s);
    }

    if !d.remedios.is_empty() {
        let mut s = String::from("🏠 Remedios caseros:");
        for r in &d.remedios {
            let mut line = r.nombre.clone();
            if let Some(prep) = non_empty(&r.preparacion).or(non_empty(&r.descripcion)) {
                line.push_str(&format!(": {}", prep));
            }
            push_bullets(&mut s, std::iter::once(line.as_str()));
        }
        sections.push(s);
    }

    if !d.consejos_dieta.is_empty() {
        let mut s = String::from("🥗 Alimentación:");
        push_bullets(&mut s, d.consejos_dieta.iter().map(String::as_str));
        sections.push(s);
    }

    if !d.consejos_habitos.is_empty() {
        let mut s = String::from("🧘 Hábitos:");
        push_bullets(&mut s, d.consejos_habitos.iter().map(String::as_str));
        sections.push(s);
    }

    let tiempo = non_empty(&d.tiempo_mejoria).unwrap_or(DEFAULT_IMPROVEMENT_TIME);
    sections.push(format!("⏱️ Tiempo estimado de mejoría: {}", tiempo));

    if !d.advertencias.is_empty() {
        let mut s = String::from("⚠️ Advertencias:");
        push_bullets(&mut s, d.advertencias.iter().map(String::as_str));
        sections.push(s);
    }

    if let Some(medico) = non_empty(&d.cuando_ver_medico) {
        sections.push(format!("👩‍⚕️ Cuándo ver al médico: {}", medico));
    }

    sections.join("\n\n")
}

/// Short sentence read aloud when a diagnosis arrives.
pub fn spoken_summary(d: &DiagnosisResult) -> String {
    match non_empty(&d.diagnostico) {
        Some(condition) => format!(
            "Según lo que me contaste, podrías tener {}. Te dejo las recomendaciones en pantalla.",
            condition
        ),
        None => "Te dejo las recomendaciones en pantalla.".to_string(),
    }
}

fn push_bullets<'a>(out: &mut String, items: impl Iterator<Item = &'a str>) {
    for item in items {
        out.push_str("\n• ");
        out.push_str(item);
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
