//! Shopper-facing strings (French storefront).

pub const EMPTY_INPUT: &str = "Veuillez renseigner la marque et le modèle de votre vélo.";

pub const MISSING_DATA: &str = "Certaines données sont manquantes, contactez notre équipe.";
pub const THRU_AXLE: &str =
    "Axe traversant non supporté : le vélo n'est pas compatible avec nos kits actuels.";
pub const BASE_KIT_ONLY: &str = "Compatibilité confirmée avec notre kit de base.";
pub const ALL_KITS: &str =
    "Excellente compatibilité ! Votre vélo est compatible avec tous nos kits.";
pub const BOTTLE_MOUNT: &str = "Présence d'inserts porte-gourde détectée.";

pub const FRAME_LENGTH: &str =
    "Compatible si le cadre offre une longueur suffisante pour la batterie.";
pub const NON_STANDARD_GEOMETRY: &str =
    "Le vélo n'est pas compatible avec nos kits actuels (axe traversant ou entraxe non standard).";

pub fn fork_spacing(spacing_mm: f64) -> String {
    format!(
        "Entraxe de fourche de {} mm non standard (100 mm requis) : le vélo n'est pas compatible avec nos kits actuels.",
        spacing_mm
    )
}

pub fn brake_type(brake: &str) -> String {
    format!("Type de freins : {}.", brake)
}

pub fn unknown_brand(brand: &str, model: &str) -> String {
    format!(
        "Marque {} ou modèle {} non reconnu dans notre base de données. Contactez notre équipe pour une analyse personnalisée.",
        brand, model
    )
}

pub fn unknown_model(brand: &str, model: &str) -> String {
    format!(
        "Nous connaissons la marque {} mais pas ce modèle spécifique ({}). Notre équipe peut vous aider à déterminer la compatibilité.",
        brand, model
    )
}
