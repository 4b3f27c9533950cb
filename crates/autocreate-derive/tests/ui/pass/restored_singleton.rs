use autocreate_core::{auto_create, AutoCreate, CreationPolicy};
use serde::{Deserialize, Serialize};

#[auto_create(restore)]
#[derive(Default, Serialize, Deserialize)]
pub struct QualitySettings {
    shadows: bool,
    draw_distance: f32,
}

fn main() {
    assert_eq!(
        QualitySettings::descriptor().policy(),
        CreationPolicy::RestoreFromStorage
    );
}
