use nth_host::engine::Engine;
use nth_host::persistence::store::{DirectoryStore, MemoryStore, SaveStore};
use nth_host::persistence::{decode_blob, PersistenceManager};
use nth_host::scheduler::{RenderScheduler, RunState};
use nth_host::session::Session;
use nth_host::{InputKeys, LCD_BUFFER_SIZE};
use std::num::NonZeroU32;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
#[error("not a cartridge")]
struct NotACartridge;

/// Pretends to be a cartridge with 256 bytes of battery RAM and no clock.
/// Every frame with A held increments the first RAM byte.
struct BatteryEngine {
    ram: Vec<u8>,
    lcd: Vec<u8>,
    a_held: bool,
}

impl Engine for BatteryEngine {
    type Error = NotACartridge;

    fn new(rom: &[u8], ram: &[u8], _rtc: &[u8]) -> Result<Self, Self::Error> {
        if rom.is_empty() {
            return Err(NotACartridge);
        }

        let mut saved = ram.to_vec();
        saved.resize(256, 0);

        Ok(Self {
            ram: saved,
            lcd: vec![0x00; LCD_BUFFER_SIZE],
            a_held: false,
        })
    }

    fn next_frame(&mut self) {
        if self.a_held {
            self.ram[0] = self.ram[0].wrapping_add(1);
        }
    }

    fn lcd_buffer(&self) -> &[u8] {
        &self.lcd
    }

    fn set_button(&mut self, key: InputKeys, pressed: bool) {
        if key == InputKeys::A {
            self.a_held = pressed;
        }
    }

    fn dump_ram(&self) -> Vec<u8> {
        self.ram.clone()
    }

    fn dump_rtc(&self) -> Vec<u8> {
        Vec::new()
    }
}

fn play_frames<S: SaveStore>(session: &mut Session<BatteryEngine, S>, frames: usize) {
    let mut scheduler = RenderScheduler::new(NonZeroU32::new(1).unwrap());
    session.engine_mut().unwrap().set_button(InputKeys::A, true);

    for _ in 0..frames {
        assert!(scheduler.tick(session, Instant::now()).unwrap().is_some());
    }
    assert_eq!(scheduler.state(), RunState::Running);
}

#[test]
fn fresh_cartridge_then_reload() {
    let mut session = Session::<BatteryEngine, _>::new(PersistenceManager::new(MemoryStore::new()));

    // No prior save: engine starts from empty blobs.
    assert!(session.persistence().load("game.gb").ram.is_empty());
    session.load_cartridge("game.gb", &[0x01; 0x150]).unwrap();
    play_frames(&mut session, 5);

    // Page teardown saves the active instance.
    session.persist().unwrap();

    let store = session.persistence().store();
    let saved = decode_blob(&store.get("game.gb.sav").unwrap().unwrap()).unwrap();
    assert_eq!(saved.len(), 256);
    assert_eq!(saved[0], 5);
    assert!(store.get("game.gb.rtc").unwrap().is_none());

    // Reloading the same identity restores the RAM.
    session.load_cartridge("game.gb", &[0x01; 0x150]).unwrap();
    let loaded = session.persistence().load("game.gb");
    assert_eq!(loaded.ram, saved);
    assert!(loaded.rtc.is_empty());
    assert_eq!(session.engine().unwrap().ram, saved);
}

#[test]
fn corrupt_save_starts_fresh() {
    let mut store = MemoryStore::new();
    store.set("game.gb.sav", "[1, 2, oops").unwrap();
    let mut session = Session::<BatteryEngine, _>::new(PersistenceManager::new(store));

    session.load_cartridge("game.gb", &[0x01]).unwrap();

    assert_eq!(session.engine().unwrap().ram, vec![0; 256]);
}

#[test]
fn saves_survive_on_disk() {
    let dir = std::env::temp_dir().join("nth_host_saves_survive_on_disk");
    let _ = std::fs::remove_dir_all(&dir);

    {
        let mut session = Session::<BatteryEngine, _>::new(PersistenceManager::new(DirectoryStore::new(&dir)));
        session.load_cartridge("game.gb", &[0x01]).unwrap();
        play_frames(&mut session, 3);
        session.eject().unwrap();
    }

    let mut session = Session::<BatteryEngine, _>::new(PersistenceManager::new(DirectoryStore::new(&dir)));
    session.load_cartridge("game.gb", &[0x01]).unwrap();
    assert_eq!(session.engine().unwrap().ram[0], 3);
    assert!(!dir.join("game.gb.rtc").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}
