use super::card::Card;
use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::iter::repeat;

pub const NUM_ACCEPT_CARDS: usize = 6;
pub const NUM_REJECT_CARDS: usize = 11;
pub const NUM_CARDS: usize = NUM_ACCEPT_CARDS + NUM_REJECT_CARDS;

/// The draw pile, the discard pile and the cards currently under review.
///
/// The last entry of `deck` is the top of the draw pile.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Deck {
    deck: Vec<Card>,
    discard: Vec<Card>,
    hand: Vec<Card>,
}

impl Deck {
    /// Creates a freshly shuffled deck of every card.
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut deck = Vec::with_capacity(NUM_CARDS);
        deck.extend(repeat(Card::Accept).take(NUM_ACCEPT_CARDS));
        deck.extend(repeat(Card::Reject).take(NUM_REJECT_CARDS));
        deck.shuffle(rng);
        Self {
            deck,
            discard: vec![],
            hand: vec![],
        }
    }

    /// Shuffles the discard pile into the deck, if there are fewer than three cards in the draw deck.
    pub fn check_shuffle(&mut self, rng: &mut impl Rng) -> bool {
        if self.deck.len() >= 3 {
            return false;
        }
        self.deck.append(&mut self.discard);
        self.deck.shuffle(rng);
        true
    }

    /// Draws the top card from the deck.
    pub fn draw_one(&mut self) -> Option<Card> {
        self.deck.pop()
    }

    /// Moves the top three cards of the deck into the hand.
    pub fn draw_three(&mut self) -> bool {
        if self.deck.len() < 3 || !self.hand.is_empty() {
            return false;
        }
        let top = self.deck.split_off(self.deck.len() - 3);
        self.hand = top;
        true
    }

    /// Moves the card at `index` in the hand to the discard pile.
    pub fn discard_from_hand(&mut self, index: usize) -> Option<Card> {
        if index >= self.hand.len() {
            return None;
        }
        let card = self.hand.remove(index);
        self.discard.push(card);
        Some(card)
    }

    /// Removes the card at `index` from the hand to be played, discarding the rest of the hand.
    pub fn play_from_hand(&mut self, index: usize) -> Option<Card> {
        if index >= self.hand.len() {
            return None;
        }
        let card = self.hand.remove(index);
        self.discard.append(&mut self.hand);
        Some(card)
    }

    /// Discards the whole hand.
    pub fn discard_hand(&mut self) {
        self.discard.append(&mut self.hand);
    }

    /// The top three cards of the draw pile, topmost first.
    pub fn peek_three(&self) -> Vec<Card> {
        self.deck.iter().rev().take(3).copied().collect()
    }

    /// The cards under review.
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    /// The number of cards in the draw pile.
    pub fn count(&self) -> usize {
        self.deck.len()
    }

    /// The number of cards in the discard pile.
    #[cfg(test)]
    pub fn discard_count(&self) -> usize {
        self.discard.len()
    }

    /// The number of cards not yet played: draw pile, discard pile and hand.
    #[cfg(test)]
    pub fn in_play(&self) -> usize {
        self.deck.len() + self.discard.len() + self.hand.len()
    }

    #[cfg(test)]
    pub fn stack(&mut self, top: &[Card]) {
        // Rebuild the piles so that `top` sits on the draw pile, topmost first, keeping totals.
        let mut rest: Vec<Card> = self.deck.drain(..).chain(self.discard.drain(..)).collect();
        for card in top {
            let idx = rest.iter().position(|c| c == card).expect("card available to stack");
            rest.remove(idx);
        }
        self.deck = rest;
        self.deck.extend(top.iter().rev());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn count(cards: &[Card], kind: Card) -> usize {
        cards.iter().filter(|c| **c == kind).count()
    }

    #[test]
    fn new_deck_has_every_card() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let deck = Deck::new(&mut rng);
        assert_eq!(deck.count(), NUM_CARDS);
        assert_eq!(count(&deck.deck, Card::Accept), NUM_ACCEPT_CARDS);
        assert_eq!(count(&deck.deck, Card::Reject), NUM_REJECT_CARDS);
    }

    #[test]
    fn draw_three_takes_the_top() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut deck = Deck::new(&mut rng);
        let expected = deck.deck[NUM_CARDS - 3..].to_vec();
        let peeked = deck.peek_three();
        assert!(deck.draw_three());
        assert_eq!(deck.hand(), &expected[..]);
        assert_eq!(peeked, expected.into_iter().rev().collect::<Vec<_>>());
        assert_eq!(deck.in_play(), NUM_CARDS);
    }

    #[test]
    fn cannot_draw_over_an_existing_hand() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut deck = Deck::new(&mut rng);
        assert!(deck.draw_three());
        assert!(!deck.draw_three());
        assert_eq!(deck.hand().len(), 3);
    }

    #[test]
    fn reshuffle_conserves_cards() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut deck = Deck::new(&mut rng);
        let mut played = 0;
        while deck.count() >= 3 {
            deck.draw_three();
            deck.discard_from_hand(0).unwrap();
            deck.play_from_hand(1).unwrap();
            played += 1;
            assert_eq!(deck.in_play() + played, NUM_CARDS);
        }
        assert!(deck.check_shuffle(&mut rng));
        assert_eq!(deck.discard_count(), 0);
        assert_eq!(deck.count() + played, NUM_CARDS);
        assert!(!deck.check_shuffle(&mut rng));
    }

    #[test]
    fn out_of_range_cards_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut deck = Deck::new(&mut rng);
        deck.draw_three();
        assert_eq!(deck.discard_from_hand(3), None);
        assert_eq!(deck.hand().len(), 3);
    }
}
