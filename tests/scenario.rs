use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use vmcore::{
    BitWidth, Clock, ClockEvent, ClockEventKind, EventLoop, Keyboard, ManualTime, RegisterBank,
    Stack, Timed,
};

fn record(clock: &mut Clock) -> Rc<RefCell<Vec<ClockEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for kind in [
        ClockEventKind::Start,
        ClockEventKind::Tick,
        ClockEventKind::Pause,
        ClockEventKind::Resume,
        ClockEventKind::Stop,
    ] {
        let log = log.clone();
        clock.subscribe(kind, move |e| log.borrow_mut().push(*e));
    }
    log
}

fn counters(events: &[ClockEvent]) -> Vec<(ClockEventKind, u64, u64)> {
    events
        .iter()
        .map(|e| (e.kind, e.ticks_in_cycle, e.ticks_total))
        .collect()
}

#[test]
fn test_sixty_hertz_start_pause_resume() {
    let time = Rc::new(ManualTime::new());
    let mut clock = Clock::new(60, time.clone()).unwrap();
    let log = record(&mut clock);
    let event_loop = EventLoop::new(time.clone());

    assert!(clock.start());
    assert_eq!(
        counters(&log.borrow()),
        vec![(ClockEventKind::Start, 0, 0)]
    );

    // three intervals of 16.67ms
    event_loop.run_for(&mut [&mut clock], Duration::from_millis(50));
    assert_eq!(clock.ticks(), 3);
    assert_eq!(
        counters(&log.borrow()[1..]),
        vec![
            (ClockEventKind::Tick, 1, 1),
            (ClockEventKind::Tick, 2, 2),
            (ClockEventKind::Tick, 3, 3),
        ]
    );

    assert!(clock.pause());
    assert_eq!(
        counters(&log.borrow()[4..]),
        vec![(ClockEventKind::Pause, 3, 3)]
    );
    event_loop.run_for(&mut [&mut clock], Duration::from_millis(500));
    assert_eq!(clock.ticks(), 3);

    assert!(clock.resume());
    event_loop.run_for(&mut [&mut clock], Duration::from_millis(17));
    assert_eq!(
        counters(&log.borrow()[5..]),
        vec![
            (ClockEventKind::Resume, 3, 3),
            (ClockEventKind::Tick, 4, 4),
        ]
    );
}

// an interpreter waiting on a key (FX0A) while the clock keeps ticking
#[test]
fn test_key_wait_does_not_block_ticks() {
    let time = Rc::new(ManualTime::new());
    let mut clock = Clock::new(100, time.clone()).unwrap();
    let keyboard = Rc::new(RefCell::new(Keyboard::chip8(time.clone())));
    let mut registers = RegisterBank::new();
    registers.create("v3", BitWidth::W8).unwrap();
    let registers = Rc::new(RefCell::new(registers));

    let pending = Rc::new(keyboard.borrow_mut().await_next_key().unwrap());
    let waited = Rc::new(RefCell::new(0));
    {
        let pending = pending.clone();
        let registers = registers.clone();
        let waited = waited.clone();
        clock.subscribe(ClockEventKind::Tick, move |_| match pending.poll() {
            Some(code) => {
                registers.borrow_mut().set("v3", code as u64).unwrap();
            }
            None => *waited.borrow_mut() += 1,
        });
    }

    clock.start();
    let event_loop = EventLoop::new(time.clone());
    event_loop.run_for(&mut [&mut clock], Duration::from_millis(45));
    assert_eq!(*waited.borrow(), 4);

    keyboard.borrow_mut().observe_char('e').unwrap();
    event_loop.run_for(&mut [&mut clock], Duration::from_millis(10));
    assert_eq!(registers.borrow().get("v3").unwrap(), 0x6);
    assert!(keyboard.borrow().is_pressed(0x6));

    keyboard.borrow_mut().poll();
    time.advance_ms(200);
    keyboard.borrow_mut().poll();
    assert!(keyboard.borrow().pressed_snapshot().is_empty());
}

#[test]
fn test_call_and_return_through_stack() {
    let mut stack = Stack::<u16>::new(16).unwrap();
    let mut registers = RegisterBank::new();
    registers.create("pc", BitWidth::W16).unwrap();
    registers.set("pc", 0x202).unwrap();

    // 2NNN: push the return address and jump
    stack.push(registers.get("pc").unwrap()).unwrap();
    registers.set("pc", 0x300).unwrap();
    // 00EE: return
    let back = stack.pop().unwrap();
    registers.set("pc", back as u64).unwrap();

    assert_eq!(registers.get("pc").unwrap(), 0x202);
    assert!(stack.is_empty());
    assert!(stack.pop().is_err());
}
