use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

use vmcore::input::{keymap_from_chars, CHIP8_CONVENTIONAL_KEYMAP};
use vmcore::{
    BitWidth, ClockEventKind, EventLoop, MachineConfig, RegisterBank, Stack, TimeSource,
    TypedStore, WallTime,
};

/// just enough of a CPU to show the substrate being driven: 7XNN (add) and
/// 1NNN (jump)
struct Toy {
    memory: TypedStore<u8>,
    registers: RegisterBank,
    stack: Stack<u16>,
}

impl Toy {
    fn step(&mut self, ticks_in_cycle: u64) -> Result<(), Box<dyn Error>> {
        let pc = self.registers.get("pc")? as usize;
        let opcode = self.memory.fetch_u16(pc)?;
        self.registers.inc("pc", 2)?;
        match opcode & 0xf000 {
            0x1000 => {
                self.registers.set("pc", (opcode & 0x0fff) as u64)?;
            }
            0x7000 => {
                let vx = format!("v{:x}", (opcode & 0x0f00) >> 8);
                self.registers.inc(&vx, (opcode & 0x00ff) as u64)?;
            }
            _ => return Err(format!("unknown opcode {:#06x}", opcode).into()),
        }
        // once a second, remember where v0 had got to
        if ticks_in_cycle % 60 == 0 {
            self.stack.push(self.registers.get("v0")?)?;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = MachineConfig::default();
    config.validate()?;
    let time: Rc<dyn TimeSource> = Rc::new(WallTime::new());

    // load a program
    let mut memory = config.memory::<u8>()?;
    let mut prog: &[u8] = &[0x70, 0x01, 0x12, 0x00]; // add v0, 1; jump 0x200
    memory.load(&mut prog, 0x200)?;

    let mut registers = RegisterBank::new();
    for n in 0..16 {
        registers.create(&format!("v{:x}", n), BitWidth::W8)?;
    }
    registers.create("pc", BitWidth::W16)?;
    registers.set("pc", 0x200)?;

    let toy = Rc::new(RefCell::new(Toy {
        memory,
        registers,
        stack: config.stack::<u16>()?,
    }));

    let mut clock = config.clock(time.clone())?;
    let mut keyboard = config.keyboard(keymap_from_chars(&CHIP8_CONVENTIONAL_KEYMAP), time.clone());
    let t = toy.clone();
    clock.subscribe(ClockEventKind::Tick, move |e| {
        if let Err(err) = t.borrow_mut().step(e.ticks_in_cycle) {
            eprintln!("Warning: tick {}: {}", e.ticks_total, err);
        }
    });

    let event_loop = EventLoop::new(time);
    clock.start();
    keyboard.observe_char('d')?;
    event_loop.run_for(&mut [&mut clock, &mut keyboard], Duration::from_millis(100));
    println!("after 100ms: held keys {:?}", keyboard.pressed_snapshot());
    event_loop.run_for(&mut [&mut clock, &mut keyboard], Duration::from_millis(2_000));
    clock.stop();

    let toy = toy.borrow();
    println!(
        "ran {} ticks ({:?} emulated), v0 = {:#04x}, stack depth {}, held keys {:?}",
        clock.ticks(),
        clock.time_passed(),
        toy.registers.get("v0")?,
        toy.stack.top(),
        keyboard.pressed_snapshot()
    );
    Ok(())
}
