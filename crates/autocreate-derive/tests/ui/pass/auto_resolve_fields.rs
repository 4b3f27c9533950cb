use autocreate_core::{AutoCreator, AutoResolve, MarkedType, MemoryStore};
use std::sync::Arc;

#[derive(Default)]
pub struct Camera;

#[derive(Default, AutoResolve)]
pub struct Transform {
    #[auto_resolve]
    camera: Option<Arc<Camera>>,
}

#[derive(Default, AutoResolve)]
pub struct Player {
    #[auto_resolve(nested)]
    transform: Transform,
    #[auto_resolve]
    camera: Option<Arc<Camera>>,
    health: u32,
}

fn main() {
    let creator = AutoCreator::builder()
        .with_types(vec![MarkedType::constructed::<Camera>().build()])
        .with_bridge(MemoryStore::new())
        .build();
    creator.initialize().unwrap();

    let mut player = Player::default();
    let report = creator.resolve(&mut player);

    assert_eq!(report.resolved, 2);
    assert!(player.transform.camera.is_some());
    assert!(player.camera.is_some());
    assert_eq!(player.health, 0);
}
