//! Advent of Code 2020 solutions. The binary picks a day and part; each
//! day's machinery lives in its own module.

pub mod seating;
