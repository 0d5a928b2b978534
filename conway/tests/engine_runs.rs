use std::collections::BTreeSet;
use std::time::Duration;

use conway::patterns::{self, BLINKER, BLOCK};
use conway::{
    Cell, Command, Engine, EngineError, EngineHandle, Event, Grid, IoHandle, MemoryStore, Params,
    RunOutcome, RunState,
};
use tokio::sync::mpsc::Receiver;
use tokio::time::{sleep, timeout};

const PATIENCE: Duration = Duration::from_secs(10);

fn start(params: Params, grid: &Grid) -> (EngineHandle, MemoryStore) {
    let store = MemoryStore::new();
    store.insert_grid(grid);
    let (io, _thread) = IoHandle::spawn(store.clone()).unwrap();
    let handle = Engine::new(params, io).unwrap().spawn();
    (handle, store)
}

async fn collect(events: &mut Receiver<Event>) -> Vec<Event> {
    let mut all = Vec::new();
    while let Some(event) = timeout(PATIENCE, events.recv()).await.expect("event stream stalled") {
        all.push(event);
    }
    all
}

async fn wait_for(events: &mut Receiver<Event>, mut wanted: impl FnMut(&Event) -> bool) -> Event {
    loop {
        let event = timeout(PATIENCE, events.recv())
            .await
            .expect("event stream stalled")
            .expect("event stream closed");
        if wanted(&event) {
            return event;
        }
    }
}

fn final_alive(events: &[Event]) -> BTreeSet<Cell> {
    events
        .iter()
        .find_map(|event| match event {
            Event::FinalTurnComplete { alive, .. } => Some(alive.iter().copied().collect()),
            _ => None,
        })
        .expect("no FinalTurnComplete")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_zero_turns_reports_initial_grid() {
    let mut grid = Grid::new(16, 16);
    patterns::random_fill(&mut grid, 3);
    let initial: BTreeSet<Cell> = grid.alive_cells().into_iter().collect();

    let (mut handle, store) = start(Params::new(16, 16, 0, 4), &grid);
    let events = collect(&mut handle.events).await;
    assert_eq!(handle.task.await.unwrap().unwrap(), RunOutcome::Completed { turns: 0 });

    let seeded: BTreeSet<Cell> = events
        .iter()
        .filter_map(|event| match event {
            Event::CellFlipped { completed_turns: 0, cell } => Some(*cell),
            _ => None,
        })
        .collect();
    assert_eq!(seeded, initial);
    assert_eq!(final_alive(&events), initial);
    assert_eq!(
        events.last(),
        Some(&Event::StateChange {
            completed_turns: 0,
            new_state: RunState::Quitting
        })
    );
    assert_eq!(store.get("16x16x0"), Some(grid.to_bytes()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_blinker_flips_are_ordered_by_turn() {
    let mut grid = Grid::new(16, 16);
    patterns::place(&mut grid, &BLINKER, Cell::new(6, 7));

    let (mut handle, store) = start(Params::new(16, 16, 2, 3), &grid);
    let events = collect(&mut handle.events).await;
    assert_eq!(handle.task.await.unwrap().unwrap(), RunOutcome::Completed { turns: 2 });

    // Seeding flips for turn 0 come first, then each turn's flips precede
    // its TurnComplete.
    let mut last_complete = 0;
    let mut seeding = true;
    for event in &events {
        match event {
            Event::CellFlipped { completed_turns: 0, .. } => assert!(seeding),
            Event::CellFlipped { completed_turns, .. } => {
                seeding = false;
                assert_eq!(*completed_turns, last_complete + 1);
            }
            Event::TurnComplete { completed_turns } => {
                seeding = false;
                assert_eq!(*completed_turns, last_complete + 1);
                last_complete = *completed_turns;
            }
            _ => {}
        }
    }
    assert_eq!(last_complete, 2);

    // Each turn flips the two ends of the blinker on and off.
    let turn_one_flips = events
        .iter()
        .filter(|event| matches!(event, Event::CellFlipped { completed_turns: 1, .. }))
        .count();
    assert_eq!(turn_one_flips, 4);

    let initial: BTreeSet<Cell> = grid.alive_cells().into_iter().collect();
    assert_eq!(final_alive(&events), initial);
    assert_eq!(store.get("16x16x2"), Some(grid.to_bytes()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_count_does_not_change_result() {
    let mut grid = Grid::new(40, 29);
    patterns::random_fill(&mut grid, 11);

    let mut results = Vec::new();
    for threads in [1, 2, 5, 8, 29] {
        let (mut handle, store) = start(Params::new(40, 29, 20, threads), &grid);
        let events = collect(&mut handle.events).await;
        handle.task.await.unwrap().unwrap();
        results.push((threads, final_alive(&events), store.get("40x29x20").unwrap()));
    }

    let (_, expected_alive, expected_bytes) = &results[0];
    for (threads, alive, bytes) in &results[1..] {
        assert_eq!(alive, expected_alive, "{threads} workers");
        assert_eq!(bytes, expected_bytes, "{threads} workers");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_still_life_never_flips() {
    let mut grid = Grid::new(12, 12);
    patterns::place(&mut grid, &BLOCK, Cell::new(4, 4));

    let (mut handle, _store) = start(Params::new(12, 12, 25, 4), &grid);
    let events = collect(&mut handle.events).await;
    handle.task.await.unwrap().unwrap();

    let later_flip = |event: &Event| {
        matches!(event, Event::CellFlipped { completed_turns, .. } if *completed_turns > 0)
    };
    assert!(!events.iter().any(later_flip));
    let turns: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::TurnComplete { completed_turns } => Some(*completed_turns),
            _ => None,
        })
        .collect();
    assert_eq!(turns, (1..=25).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pause_freezes_until_resume_then_quit() {
    let mut grid = Grid::new(64, 64);
    patterns::random_fill(&mut grid, 5);
    let params = Params::new(64, 64, 1_000_000, 4).with_tick_interval(Duration::from_millis(10));

    let (mut handle, store) = start(params, &grid);
    let events = &mut handle.events;

    wait_for(events, |event| {
        matches!(event, Event::TurnComplete { completed_turns } if *completed_turns >= 3)
    })
    .await;
    wait_for(events, |event| matches!(event, Event::AliveCellsCount { .. })).await;

    handle.commands.send(Command::from_key('p').unwrap()).await.unwrap();
    let paused = wait_for(events, |event| matches!(event, Event::StateChange { .. })).await;
    assert!(matches!(
        paused,
        Event::StateChange {
            new_state: RunState::Paused,
            ..
        }
    ));

    // Let any in-flight turn land, then nothing else may arrive.
    sleep(Duration::from_millis(100)).await;
    let mut frozen_turn = paused.completed_turns();
    while let Ok(event) = events.try_recv() {
        if let Event::TurnComplete { completed_turns } = event {
            frozen_turn = completed_turns;
        }
    }
    assert!(frozen_turn <= paused.completed_turns() + 1);

    sleep(Duration::from_millis(200)).await;
    assert!(events.try_recv().is_err(), "events emitted while paused");

    handle.commands.send(Command::Resume).await.unwrap();
    assert_eq!(
        wait_for(events, |event| matches!(event, Event::StateChange { .. })).await,
        Event::StateChange {
            completed_turns: frozen_turn,
            new_state: RunState::Running
        }
    );
    wait_for(events, |event| {
        matches!(event, Event::TurnComplete { completed_turns } if *completed_turns > frozen_turn)
    })
    .await;

    handle.commands.send(Command::Quit).await.unwrap();
    let rest = collect(events).await;
    assert!(rest.iter().all(|event| !matches!(event, Event::FinalTurnComplete { .. })));
    let Some(Event::StateChange {
        completed_turns: quit_turn,
        new_state: RunState::Quitting,
    }) = rest.last().cloned()
    else {
        panic!("run did not end with Quitting: {:?}", rest.last());
    };

    let RunOutcome::Quit { turn } = handle.task.await.unwrap().unwrap() else {
        panic!("expected the run to be quit");
    };
    assert_eq!(turn, quit_turn);
    assert!(store.get(&Params::output_name(64, 64, quit_turn)).is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_quit_while_paused() {
    let mut grid = Grid::new(32, 32);
    patterns::random_fill(&mut grid, 9);
    let (mut handle, store) = start(Params::new(32, 32, 1_000_000, 2), &grid);

    handle.commands.send(Command::Pause).await.unwrap();
    wait_for(&mut handle.events, |event| matches!(event, Event::StateChange { .. })).await;
    handle.commands.send(Command::Save).await.unwrap();
    handle.commands.send(Command::Quit).await.unwrap();

    let rest = collect(&mut handle.events).await;
    assert!(matches!(
        rest.last(),
        Some(Event::StateChange {
            new_state: RunState::Quitting,
            ..
        })
    ));
    assert!(matches!(handle.task.await.unwrap().unwrap(), RunOutcome::Quit { .. }));
    assert!(store.names().iter().any(|name| name.starts_with("32x32x")));
}

#[tokio::test]
async fn test_single_worker_quits_at_next_turn() {
    let mut grid = Grid::new(32, 32);
    patterns::random_fill(&mut grid, 13);
    let (mut handle, store) = start(Params::new(32, 32, 20_000, 1), &grid);

    handle.commands.send(Command::Quit).await.unwrap();
    let events = collect(&mut handle.events).await;

    let RunOutcome::Quit { turn } = handle.task.await.unwrap().unwrap() else {
        panic!("expected the run to be quit");
    };
    assert!(turn <= 1, "quit landed at turn {turn}");
    assert!(matches!(
        events.last(),
        Some(Event::StateChange {
            new_state: RunState::Quitting,
            completed_turns,
        }) if *completed_turns == turn
    ));
    assert!(store.get(&Params::output_name(32, 32, turn)).is_some());
}

#[tokio::test]
async fn test_bad_params_rejected_before_start() {
    let (io, _thread) = IoHandle::spawn(MemoryStore::new()).unwrap();
    for params in [Params::new(16, 16, 1, 0), Params::new(16, 8, 1, 9), Params::new(0, 8, 1, 1)] {
        assert!(matches!(Engine::new(params, io.clone()), Err(EngineError::Config(_))));
    }
}

#[tokio::test]
async fn test_short_input_fails_run() {
    let store = MemoryStore::new();
    store.insert("8x8", vec![0; 60]);
    let (io, _thread) = IoHandle::spawn(store).unwrap();

    let mut handle = Engine::new(Params::new(8, 8, 5, 2), io).unwrap().spawn();
    assert!(collect(&mut handle.events).await.is_empty());
    assert!(matches!(
        handle.task.await.unwrap(),
        Err(EngineError::Dimensions {
            expected: 64,
            actual: 60,
            ..
        })
    ));
}
