//! Economy ledger: money, lives, wave index, and terminal flags.

use tower_defence_core::{Event, LedgerSnapshot};

/// Authoritative economy state.
///
/// Spending fails closed, the life count saturates at zero, and the two
/// terminal flags are set-once and mutually exclusive: whichever outcome
/// fires first wins and the other declaration becomes a no-op.
#[derive(Debug)]
pub(crate) struct Ledger {
    money: u32,
    lives: u32,
    starting_lives: u32,
    wave_index: u32,
    game_over: bool,
    game_won: bool,
}

impl Ledger {
    pub(crate) fn new(starting_money: u32, starting_lives: u32) -> Self {
        Self {
            money: starting_money,
            lives: starting_lives,
            starting_lives,
            wave_index: 0,
            game_over: false,
            game_won: false,
        }
    }

    pub(crate) fn wave_index(&self) -> u32 {
        self.wave_index
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.game_over || self.game_won
    }

    /// Debits `amount` iff the balance covers it; no mutation otherwise.
    pub(crate) fn try_spend(&mut self, amount: u32, out_events: &mut Vec<Event>) -> bool {
        let Some(remaining) = self.money.checked_sub(amount) else {
            return false;
        };
        self.money = remaining;
        out_events.push(Event::MoneyChanged { money: self.money });
        true
    }

    pub(crate) fn earn(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        self.money = self.money.saturating_add(amount);
        out_events.push(Event::MoneyChanged { money: self.money });
    }

    /// Removes one life; at zero the loss declaration runs (set-once).
    pub(crate) fn lose_life(&mut self, out_events: &mut Vec<Event>) {
        self.lives = self.lives.saturating_sub(1);
        out_events.push(Event::LivesChanged { lives: self.lives });
        if self.lives == 0 {
            self.declare_loss(out_events);
        }
    }

    pub(crate) fn declare_loss(&mut self, out_events: &mut Vec<Event>) {
        if self.is_terminal() {
            return;
        }
        self.game_over = true;
        out_events.push(Event::GameOver);
    }

    pub(crate) fn declare_win(&mut self, out_events: &mut Vec<Event>) {
        if self.is_terminal() {
            return;
        }
        self.game_won = true;
        out_events.push(Event::GameWon);
    }

    pub(crate) fn advance_wave(&mut self) {
        self.wave_index = self.wave_index.saturating_add(1);
    }

    /// Restores episode-start state in place and re-announces the balances.
    pub(crate) fn reset(
        &mut self,
        starting_money: u32,
        starting_lives: u32,
        out_events: &mut Vec<Event>,
    ) {
        self.money = starting_money;
        self.lives = starting_lives;
        self.starting_lives = starting_lives;
        self.wave_index = 0;
        self.game_over = false;
        self.game_won = false;
        out_events.push(Event::MoneyChanged { money: self.money });
        out_events.push(Event::LivesChanged { lives: self.lives });
    }

    pub(crate) fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            money: self.money,
            lives: self.lives,
            starting_lives: self.starting_lives,
            wave_index: self.wave_index,
            game_over: self.game_over,
            game_won: self.game_won,
        }
    }
}
