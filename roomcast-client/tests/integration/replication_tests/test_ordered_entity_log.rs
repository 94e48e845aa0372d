use roomcast_client::replication::{EntityCommand, EntityEvent, ReplicationScope};

use crate::integration::replication_tests::connect_player;
use crate::integration::{init_tracing, start_test_relay};
use crate::utils::wait_for;

#[tokio::test]
async fn test_every_mirror_sees_the_owner_sequence() {
    init_tracing();

    let addr = start_test_relay().await;
    let owner = connect_player(addr, ReplicationScope::Global).await;
    let owner_id = owner.client.peer_id();
    let mut watchers = vec![
        connect_player(addr, ReplicationScope::Global).await,
        connect_player(addr, ReplicationScope::Global).await,
    ];

    let (ship, escort) = {
        let mut world = owner.world.lock().await;
        let ship = world.spawn_local("Ship", 0.0, 0.0, vec![]).unwrap();
        let escort = world.spawn_local("Ship", 100.0, 0.0, vec![]).unwrap();

        world.local_mut(&ship).unwrap().move_to(10.0, 10.0).unwrap();
        world.local_mut(&escort).unwrap().move_to(90.0, 5.0).unwrap();
        world.local_mut(&ship).unwrap().move_to(20.0, 20.0).unwrap();
        world.local_mut(&escort).unwrap().rotate(45.0).unwrap();
        world.destroy_local(&ship).unwrap();
        (ship, escort)
    };

    for watcher in &mut watchers {
        let about_ship = |e: &EntityEvent| match e {
            EntityEvent::Spawned { entity_id, .. }
            | EntityEvent::Updated { entity_id, .. }
            | EntityEvent::Destroyed { entity_id, .. } => *entity_id == ship,
        };

        let spawned = wait_for(&mut watcher.entities, about_ship).await.unwrap();
        assert!(matches!(spawned, EntityEvent::Spawned { owner: o, .. } if o == owner_id));

        for (x, y) in [(10.0, 10.0), (20.0, 20.0)] {
            let update = wait_for(&mut watcher.entities, about_ship).await.unwrap();
            assert_eq!(
                update,
                EntityEvent::Updated {
                    entity_id: ship,
                    command: EntityCommand::Move {
                        entity_id: ship,
                        x,
                        y
                    }
                }
            );
        }

        let destroyed = wait_for(&mut watcher.entities, about_ship).await.unwrap();
        assert!(matches!(destroyed, EntityEvent::Destroyed { .. }));

        let world = watcher.world.lock().await;
        assert!(world.mirror(&ship).is_none());
        let escort_state = world.mirror(&escort).expect("Escort should be mirrored");
        assert_eq!((escort_state.x, escort_state.y), (90.0, 5.0));
        assert_eq!(escort_state.rotation, 45.0);
        assert_eq!(escort_state.owner, owner_id);
    }
}
