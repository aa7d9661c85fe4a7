// End-to-end games driven through the public engine API

use std::cell::RefCell;
use std::rc::Rc;

use royal_ur::games::ur::{
    Dice, ErrorKind, Event, GameEngine, Layout, MoveOutcome, Phase, ScriptedDice, Seat, TurnError,
    TOKENS_PER_PLAYER,
};

fn names() -> [String; 2] {
    ["Ann".to_string(), "Bob".to_string()]
}

fn scripted(layout: Layout, rolls: &[u8]) -> GameEngine<ScriptedDice> {
    GameEngine::new(layout, names(), ScriptedDice::new(rolls.to_vec()).unwrap()).unwrap()
}

fn record_events<D: Dice>(engine: &mut GameEngine<D>) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn symbols<D: Dice>(engine: &GameEngine<D>) -> Vec<String> {
    (0..engine.board().size()).map(|i| engine.symbol(i).unwrap()).collect()
}

// Each seat walks one cell and then steps off the board
fn sprint_layout() -> Layout {
    Layout {
        size: 4,
        rosettes: vec![],
        exits: vec![2, 3],
        paths: [vec![0, 2], vec![1, 3]],
        display: vec![vec![Some(0), Some(1)]],
    }
}

// Higher first roll starts, then a 4 carries the first token to path index 3
#[test]
fn test_first_move_from_off_board() {
    let mut game = scripted(Layout::classic(), &[3, 2, 4]);
    assert_eq!(game.start_game(), Ok(Seat::One));
    assert_eq!(game.active_player().unwrap().name(), "Ann");

    assert_eq!(game.player_roll(), Ok(4));
    let report = game.move_token("A1").unwrap();

    let path = game.player(Seat::One).path().to_vec();
    let token = game.player(Seat::One).token("A1").unwrap();
    assert!(token.is_on_board());
    assert_eq!(token.occupied_cell(), Some(path[3]));
    assert_eq!(report.to, path[3]);
    assert_eq!(game.occupancy_at(path[3]).unwrap().unwrap().id(), "A1");
}

// A token sitting on a rosette cannot be captured
#[test]
fn test_occupied_rosette_rejects_opponent() {
    let mut game = scripted(Layout::classic(), &[3, 2, 4, 4, 1, 4, 4]);
    game.start_game().unwrap();

    // Ann: A1 to the private rosette, then on to the shared one at 11
    game.player_roll().unwrap();
    assert!(game.move_token("A1").unwrap().extra_turn);
    game.player_roll().unwrap();
    let report = game.move_token("A1").unwrap();
    assert_eq!(report.to, 11);
    assert_eq!(game.active_seat(), Some(Seat::One));

    game.player_roll().unwrap();
    game.move_token("A2").unwrap();
    assert_eq!(game.active_seat(), Some(Seat::Two));

    game.player_roll().unwrap();
    game.move_token("B1").unwrap();
    assert_eq!(game.active_seat(), Some(Seat::Two));
    game.player_roll().unwrap();

    let before = symbols(&game);
    let err = game.move_token("B1").unwrap_err();
    assert_eq!(err, TurnError::GuardedRosette { cell: 11, occupant: "A1".to_string() });
    assert_eq!(err.kind(), ErrorKind::IllegalMove);

    assert_eq!(symbols(&game), before);
    assert_eq!(game.player(Seat::Two).token("B1").unwrap().occupied_cell(), Some(8));
    assert_eq!(game.player(Seat::Two).dice_roll(), 4);
    assert_eq!(game.active_seat(), Some(Seat::Two));
    assert_eq!(game.phase(), Phase::AwaitingMoveChoice);
    assert!(!game.legal_moves().contains(&"B1".to_string()));
}

// Exiting the last token wins the game and clears the board
#[test]
fn test_last_exit_wins() {
    // Ann rolls 2 and exits a token, Bob rolls 0 and forfeits, seven times
    let mut rolls = vec![3, 2];
    for _ in 0..TOKENS_PER_PLAYER - 1 {
        rolls.extend([2, 0]);
    }
    rolls.push(2);

    let mut game = scripted(sprint_layout(), &rolls);
    let events = record_events(&mut game);
    game.start_game().unwrap();

    for n in 1..=TOKENS_PER_PLAYER {
        let available = game.player(Seat::One).available_tokens().len();
        assert_eq!(game.player_roll(), Ok(2));

        let id = format!("A{}", n);
        let report = game.move_token(&id).unwrap();
        assert_eq!(report.outcome, MoveOutcome::Exited);
        assert!(game.player(Seat::One).token(&id).unwrap().has_exited());
        assert_eq!(game.player(Seat::One).available_tokens().len(), available - 1);

        if n < TOKENS_PER_PLAYER {
            assert_eq!(report.winner, None);
            assert_eq!(game.player_roll(), Ok(0));
        } else {
            assert_eq!(report.winner, Some(Seat::One));
        }
    }

    assert!(game.player(Seat::One).available_tokens().is_empty());
    assert_eq!(game.winner().unwrap().name(), "Ann");
    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(game.active_seat(), None);
    assert!(game.board().cells().iter().all(|c| !c.is_occupied()));
    assert_eq!(game.player_roll().unwrap_err().kind(), ErrorKind::IllegalCallOrder);
    assert_eq!(events.borrow().last(), Some(&Event::GameWon { player: "Ann".to_string() }));

    // A new game starts from scratch
    game.start_game().unwrap();
    assert_eq!(game.winner(), None);
    assert_eq!(game.player(Seat::One).available_tokens().len(), TOKENS_PER_PLAYER);
}

#[test]
fn test_compact_variant_plays() {
    let mut game = scripted(Layout::compact(), &[1, 4, 4]);
    assert_eq!(game.start_game(), Ok(Seat::Two));
    game.player_roll().unwrap();
    let report = game.move_token("B1").unwrap();
    assert_eq!(report.to, 7);
    assert!(report.extra_turn);
    assert_eq!(game.player(Seat::Two).path().len(), 14);
}

#[test]
fn test_rejected_calls_leave_state_alone() {
    let mut game = scripted(Layout::classic(), &[3, 2, 2]);
    let events = record_events(&mut game);
    game.start_game().unwrap();
    let seen = events.borrow().len();

    assert!(game.move_token("A1").is_err());
    assert!(game.pass_turn().is_err());
    game.player_roll().unwrap();
    assert!(game.player_roll().is_err());
    assert!(game.move_token("X").is_err());
    assert!(game.move_token("B2").is_err());

    // Only the successful roll was announced
    assert_eq!(events.borrow().len(), seen + 1);
    assert!(game.board().cells().iter().all(|c| !c.is_occupied()));
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use royal_ur::games::ur::{BinaryDice, TokenRef};

    fn check_occupancy<D: Dice>(game: &GameEngine<D>) {
        for cell in game.board().cells() {
            if let Some(occupant) = cell.occupant() {
                let token = game.token(occupant);
                assert_eq!(token.occupied_cell(), Some(cell.index()));
                assert!(token.is_on_board());
                assert!(!cell.is_exit());
            }
        }

        for seat in Seat::ALL {
            for (slot, token) in game.player(seat).tokens().iter().enumerate() {
                if token.has_exited() {
                    assert!(!token.is_on_board());
                    assert_eq!(token.occupied_cell(), None);
                }
                if let Some(cell) = token.occupied_cell() {
                    let occupant = game.board().occupancy_at(cell).unwrap();
                    assert_eq!(occupant, Some(TokenRef { seat, slot }));
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_first_player_had_higher_roll(seed in any::<u64>()) {
            let dice = BinaryDice::seeded(seed);
            let mut game = GameEngine::new(Layout::classic(), names(), dice).unwrap();
            let events = record_events(&mut game);
            let seat = game.start_game().unwrap();

            let chosen = events.borrow().iter().find_map(|e| match e {
                Event::FirstPlayerChosen { rolls, .. } => Some(*rolls),
                _ => None,
            });
            let [one, two] = chosen.unwrap();
            prop_assert_ne!(one, two);
            prop_assert_eq!(seat, if one > two { Seat::One } else { Seat::Two });
        }

        #[test]
        fn prop_random_play_keeps_invariants(
            seed in any::<u64>(),
            choices in prop::collection::vec(any::<usize>(), 200),
        ) {
            let dice = BinaryDice::seeded(seed);
            let mut game = GameEngine::new(Layout::classic(), names(), dice).unwrap();
            let events = record_events(&mut game);
            game.start_game().unwrap();

            for choice in choices {
                if game.phase() == Phase::GameOver {
                    break;
                }

                let available = [
                    game.player(Seat::One).available_tokens().len(),
                    game.player(Seat::Two).available_tokens().len(),
                ];
                let seen = events.borrow().len();

                match game.phase() {
                    Phase::AwaitingRoll => {
                        let roll = game.player_roll().unwrap();
                        prop_assert!(roll <= 4);
                    }
                    Phase::AwaitingMoveChoice => {
                        let mover = game.active_seat().unwrap();
                        let moves = game.legal_moves();
                        if moves.is_empty() {
                            game.pass_turn().unwrap();
                        } else {
                            let report = game.move_token(&moves[choice % moves.len()]).unwrap();
                            if report.extra_turn {
                                prop_assert_eq!(game.active_seat(), Some(mover));
                            }
                        }
                    }
                    _ => unreachable!(),
                }

                check_occupancy(&game);

                let exits = events.borrow()[seen..]
                    .iter()
                    .filter(|e| matches!(e, Event::TokenExited { .. }))
                    .count();
                let now = [
                    game.player(Seat::One).available_tokens().len(),
                    game.player(Seat::Two).available_tokens().len(),
                ];
                prop_assert_eq!(available[0] + available[1] - (now[0] + now[1]), exits);
                prop_assert!(now[0] <= available[0] && now[1] <= available[1]);
            }
        }
    }
}
