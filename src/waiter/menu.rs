//! Pluggable order generation.
//!
//! What gets ordered and how long it takes to cook is outside the pipeline's concern;
//! waiters only ask an [`OrderGenerator`] for the next [`DishRequest`].

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What a customer asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishRequest {
    pub dish_name: String,
    pub preparation_time: Duration,
}

impl DishRequest {
    pub fn new(dish_name: impl Into<String>, preparation_time: Duration) -> Self {
        Self {
            dish_name: dish_name.into(),
            preparation_time,
        }
    }
}

/// Source of orders for waiters.
pub trait OrderGenerator: Send + Sync {
    /// The next dish a customer orders.
    fn next_dish(&self) -> DishRequest;

    /// How long a waiter spends with customers before taking the next order.
    fn next_pause(&self) -> Duration;
}

/// The house menu, picked at random.
#[derive(Debug, Clone)]
pub struct RandomMenu {
    dishes: Vec<String>,
    preparation_secs: (u64, u64),
    pause_millis: (u64, u64),
}

impl RandomMenu {
    /// Dishes, preparation range (seconds) and pause range (milliseconds), both half-open.
    pub fn new(dishes: Vec<String>, preparation_secs: (u64, u64), pause_millis: (u64, u64)) -> Self {
        Self {
            dishes,
            preparation_secs,
            pause_millis,
        }
    }
}

impl Default for RandomMenu {
    fn default() -> Self {
        let dishes = [
            "Pizza", "Pasta", "Steak", "Salad", "Soup", "Burger", "Fish", "Dessert",
        ];
        Self::new(
            dishes.iter().map(|d| d.to_string()).collect(),
            (2, 8),
            (500, 2000),
        )
    }
}

fn pick(rng: &mut impl Rng, (low, high): (u64, u64)) -> u64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

impl OrderGenerator for RandomMenu {
    fn next_dish(&self) -> DishRequest {
        let mut rng = rand::thread_rng();
        let dish_name = if self.dishes.is_empty() {
            "Chef's special".to_string()
        } else {
            self.dishes[rng.gen_range(0..self.dishes.len())].clone()
        };
        let secs = pick(&mut rng, self.preparation_secs);
        DishRequest::new(dish_name, Duration::from_secs(secs))
    }

    fn next_pause(&self) -> Duration {
        Duration::from_millis(pick(&mut rand::thread_rng(), self.pause_millis))
    }
}

/// A scripted menu that cycles through a fixed list with a constant pause.
#[derive(Debug)]
pub struct FixedMenu {
    dishes: Vec<DishRequest>,
    pause: Duration,
    cursor: AtomicUsize,
}

impl FixedMenu {
    pub fn new(dishes: Vec<DishRequest>, pause: Duration) -> Self {
        Self {
            dishes,
            pause,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Every order is the same dish.
    pub fn single(dish_name: &str, preparation_time: Duration, pause: Duration) -> Self {
        Self::new(vec![DishRequest::new(dish_name, preparation_time)], pause)
    }
}

impl OrderGenerator for FixedMenu {
    fn next_dish(&self) -> DishRequest {
        if self.dishes.is_empty() {
            return DishRequest::new("Chef's special", Duration::ZERO);
        }
        let at = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.dishes[at % self.dishes.len()].clone()
    }

    fn next_pause(&self) -> Duration {
        self.pause
    }
}
