//! End-to-end: plan a sort, pace it through the dispatcher and check the
//! result against the host click rules or the companion server.

use clientsort_core::{ItemFlags, ItemStack, MenuSnapshot};
use clientsort_net::{encode_client_message, ClientMessage, TriggerKind};
use clientsort_server::{handle_frame, PlayerMenus, SortOutcome};
use clientsort_sort::{
    Catalog, CatalogIndex, NoCatalog, Peer, Planner, RefreshOutcome, Route, SortContext, SortOptions,
    SortOrder,
};
use clientsort_testkit::fixtures::{chest_menu, item, player_inventory_menu};
use clientsort_testkit::{ClickModel, Recorded, RecordingSink};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn messy_inventory() -> MenuSnapshot {
    player_inventory_menu([
        (9, item(1, "Stone", 20)),
        (10, item(2, "Dirt", 5)),
        (12, item(1, "Stone", 50)),
        (15, item(3, "Apple", 3)),
        (20, item(2, "Dirt", 64)),
        (
            21,
            item(9, "Bundle", 1)
                .with_max_stack_size(1)
                .with_flags(ItemFlags::BUNDLE),
        ),
        (30, item(3, "Apple", 10)),
        (35, item(1, "Stone", 7)),
        // Hotbar stays out of a main-grid sort
        (0, item(4, "Torch", 16)),
    ])
}

fn names(stacks: &[ItemStack]) -> Vec<(String, u32)> {
    stacks
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| (s.display_name().to_string(), s.count))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn local_sort_through_dispatcher() {
    let menu = messy_inventory();
    let options = SortOptions {
        sound_enabled: false,
        ..SortOptions::default()
    };
    let planner = Planner::new(options.clone(), Arc::new(NoCatalog));
    let plan = planner.plan(&SortContext::local(&menu), 9, SortOrder::Alphabet);
    assert_eq!(plan.route, Route::Local);
    assert_eq!(plan.working_set, (9..36).collect::<Vec<_>>());

    let sink = RecordingSink::new();
    let tick = options.tick_interval(Peer::Local);
    let (handle, task) = clientsort_net::spawn(sink.clone(), tick);
    let total = plan.clicks().count();
    handle.push_all(plan.events).unwrap();

    // Host confirmations for coalescing batches, ticks for the rest
    for _ in 0..total * 2 {
        handle.trigger(TriggerKind::BatchConfirmed).unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    drop(handle);
    task.await.unwrap();

    let clicks = sink.clicks();
    assert_eq!(clicks.len(), total);

    let mut model = ClickModel::from_menu(&menu);
    model.run(&clicks).unwrap();
    assert!(model.carried().is_empty());

    let sorted = model.contents(&(9..36).collect::<Vec<_>>());
    assert_eq!(
        names(&sorted),
        vec![
            ("Apple".to_string(), 13),
            ("Bundle".to_string(), 1),
            ("Dirt".to_string(), 64),
            ("Dirt".to_string(), 5),
            ("Stone".to_string(), 64),
            ("Stone".to_string(), 13),
        ]
    );
    // Empties collect at the end
    assert!(sorted[6..].iter().all(ItemStack::is_empty));
    assert_eq!(model.slots()[36].display_name(), "Torch");
}

#[tokio::test(start_paused = true)]
async fn remote_sort_applied_by_server() {
    let mut chest = chest_menu(
        5,
        1,
        vec![
            item(2, "Dirt", 3),
            ItemStack::empty(),
            item(1, "Stone", 64),
            item(3, "Apple", 1),
        ],
    );
    let planner = Planner::new(SortOptions::default(), Arc::new(NoCatalog));
    let ctx = SortContext {
        remote_available: true,
        ..SortContext::local(&chest)
    };
    let plan = planner.plan(&ctx, 0, SortOrder::Alphabet);
    assert_eq!(plan.route, Route::Remote);

    let sink = RecordingSink::new();
    let (handle, task) = clientsort_net::spawn(sink.clone(), Duration::from_millis(10));
    handle.push_all(plan.events).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(handle);
    task.await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 1);
    let Recorded::Sort(payload) = &events[0] else {
        panic!("expected a sort message, got {events:?}");
    };

    let frame = encode_client_message(&ClientMessage::ReorderInventory(payload.clone())).unwrap();
    let mut inventory = player_inventory_menu([]);
    let mut menus = PlayerMenus {
        inventory: &mut inventory,
        open: Some(&mut chest),
    };
    let outcome = handle_frame("steve", &frame, &mut menus).unwrap();
    assert!(matches!(outcome, SortOutcome::Applied(_)));

    assert_eq!(
        names(&chest.slots[..9].iter().map(|s| s.stack.clone()).collect::<Vec<_>>()),
        vec![
            ("Apple".to_string(), 1),
            ("Dirt".to_string(), 3),
            ("Stone".to_string(), 64),
        ]
    );
    assert!(chest.slots[3].stack.is_empty());
}

#[test]
fn catalog_order_follows_reference_list() {
    let reference = vec![item(3, "Apple", 1), item(1, "Stone", 1), item(2, "Dirt", 1)];
    let catalog = Arc::new(Catalog::new(Arc::new(Mutex::new(()))));
    match catalog.refresh(reference.clone(), &SortOptions::default()) {
        RefreshOutcome::Spawned(worker) => worker.join().unwrap(),
        other => panic!("expected a worker, got {other:?}"),
    }
    assert_eq!(catalog.indexed_len(), CatalogIndex::build(&reference).len());

    let menu = chest_menu(
        1,
        1,
        vec![item(2, "Dirt", 1), item(1, "Stone", 1), item(3, "Apple", 1)],
    );
    let planner = Planner::new(SortOptions::default(), catalog);
    let plan = planner.plan(&SortContext::local(&menu), 0, SortOrder::Catalog);

    let mut model = ClickModel::from_menu(&menu);
    model.run(plan.clicks()).unwrap();
    let sorted = model.contents(&[0, 1, 2]);
    assert_eq!(
        sorted.iter().map(|s| s.display_name()).collect::<Vec<_>>(),
        vec!["Apple", "Stone", "Dirt"]
    );
}
