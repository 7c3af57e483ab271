// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

// Headers used by the Atmos signature scheme.
pub const X_EMC_UID: &str = "x-emc-uid";
pub const X_EMC_SIGNATURE: &str = "x-emc-signature";
pub const X_EMC_PREFIX: &str = "x-emc-";

// Env values used to load credentials.
pub const ATMOS_UID: &str = "ATMOS_UID";
pub const ATMOS_SECRET_KEY: &str = "ATMOS_SECRET_KEY";
