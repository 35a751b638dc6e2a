// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use jiff::Zoned;

/// Source of the wall-clock time that drives daily rotation.
#[derive(Debug)]
pub enum Clock {
    /// The system clock in the system timezone.
    System,
    /// A fixed time, moved forward by tests.
    #[cfg(test)]
    Fixed(Zoned),
}

impl Clock {
    pub fn now(&self) -> Zoned {
        match self {
            Clock::System => Zoned::now(),
            #[cfg(test)]
            Clock::Fixed(now) => now.clone(),
        }
    }

    /// Move a fixed clock to `now`; the system clock ignores it.
    #[cfg(test)]
    pub fn advance_to(&mut self, now: Zoned) {
        if let Clock::Fixed(current) = self {
            *current = now;
        }
    }
}
